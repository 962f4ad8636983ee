//! Server-rendered board page.
//!
//! The page is rendered once from a state snapshot; the embedded script then
//! polls `/api/state` every 5 seconds and patches the grid in place.

use raffle::config::{NamePolicy, RaffleConfig};
use raffle::types::SlotState;

/// Everything the page template needs.
pub struct PageContext<'a> {
    pub config: &'a RaffleConfig,
    pub slots: &'a [SlotState],
    pub show_admin: bool,
    pub error_msg: Option<&'a str>,
}

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"
  :root{ --primary:#14ae5c; --muted:#555; --bgfree:#f6fff6; --bgtaken:#fff4f4; }
  body{font-family:system-ui,-apple-system,Segoe UI,Roboto,Ubuntu,Helvetica,Arial,sans-serif;margin:20px}
  .wrap{max-width:920px;margin:auto}
  h1{margin:0 0 4px}
  .meta{color:var(--muted);margin-bottom:16px}
  .banner{border:1px solid #e5e5e5;border-radius:14px;padding:12px 14px;margin:8px 0 12px;display:flex;gap:10px;align-items:center;background:#fafafa}
  .badge{background:var(--primary);color:#fff;padding:4px 10px;border-radius:999px;font-weight:600}
  .notice{background:#e8f3ff;border:1px solid #cfe4ff;color:#0b3d91;border-radius:12px;padding:8px 10px;margin:8px 0}
  .notice.warn{background:#fff3cd;border-color:#ffeeba;color:#856404}
  .grid{display:grid;grid-template-columns:repeat(10,1fr);gap:8px}
  .cell{padding:10px;border-radius:10px;text-align:center;border:1px solid #ddd}
  .free{background:var(--bgfree)}
  .taken{background:var(--bgtaken);color:#555}
  .cell small{display:block;font-size:12px;color:#666;margin-top:4px}
  .topbar{display:flex;gap:8px;align-items:center;margin:12px 0 16px;flex-wrap:wrap}
  input[type=text]{padding:8px;border:1px solid #ccc;border-radius:8px;min-width:180px}
  button{padding:8px 10px;border:0;border-radius:10px;cursor:pointer}
  .pick{background:var(--primary);color:white}
  details{margin-top:24px}
  .row{display:flex;gap:8px;align-items:center;margin:6px 0}
  .mono{font-variant-numeric:tabular-nums}
  .modal-backdrop{position:fixed;inset:0;background:rgba(0,0,0,.45);display:none;align-items:center;justify-content:center;z-index:9999}
  .modal{background:#fff;border-radius:16px;max-width:560px;width:92%;padding:16px;box-shadow:0 10px 30px rgba(0,0,0,.2)}
  .modal h2{margin:0 0 8px}
  .modal p{margin:8px 0 0;word-break:break-word}
  .modal .actions{display:flex;gap:8px;justify-content:flex-end;margin-top:14px;flex-wrap:wrap}
  .modal .ghost{background:#f2f2f2}
"#;

const SCRIPT: &str = r#"
function esc(s){ return (s||"").replace(/&/g,"&amp;").replace(/</g,"&lt;").replace(/>/g,"&gt;"); }
function freeCell(num){
  return `<div class="mono"><strong>${num}</strong></div>` +
         `<button class="pick" type="button" onclick="pickNumber('${num}', this)">Elegir</button>`;
}
function takenCell(num, name){
  return `<div class="mono"><strong>${num}</strong></div><small>Ocupado por: ${esc(name)}</small>`;
}
function downloadExport(path){
  const k = (document.getElementById('adminKeyForDownload') || {}).value || "";
  if(!k){ alert("Ingresá la ADMIN_KEY para descargar."); return; }
  window.location.href = `${path}?key=${encodeURIComponent(k)}`;
}
function share(){
  if(navigator.share){ navigator.share({title:document.title, url:window.location.href}); }
  else if(navigator.clipboard){ navigator.clipboard.writeText(window.location.href).then(() => alert("Enlace copiado. Pegalo en el grupo de WhatsApp.")); }
}
function openBankModal(){
  const m = document.getElementById('bankModal'); if(m){ m.style.display='flex'; }
}
function closeBankModal(){
  const m = document.getElementById('bankModal'); if(m){ m.style.display='none'; }
}
function copyBankInfo(){
  const el = document.getElementById('bankText');
  if(el && navigator.clipboard){ navigator.clipboard.writeText(el.textContent).then(() => alert("Datos bancarios copiados.")); }
}
if(new URLSearchParams(window.location.search).get('bank') === '1'){ openBankModal(); }
async function pickNumber(num, btn){
  const input = document.getElementById('nombre');
  const name = input ? input.value.trim() : "";
  const nameRequired = document.body.dataset.nameRequired === '1';
  if(!name && nameRequired){ alert("Escribí tu nombre para poder elegir."); if(input) input.focus(); return; }
  const who = name ? ` a nombre de "${name}"` : "";
  if(!confirm(`¿Confirmás elegir el número ${num}${who}?`)) return;
  if(btn) btn.disabled = true;
  try{
    const fd = new FormData();
    fd.append('name', name);
    const res = await fetch(`/pick/${num}`, {method:'POST', headers:{'X-Requested-With':'XMLHttpRequest'}, body:new URLSearchParams(fd)});
    if(!res.ok){ alert((await res.text()) || "No se pudo completar la reserva."); return; }
    await refreshState();
  }catch(e){
    alert("No se pudo completar la reserva. Revisá tu conexión e intentá de nuevo.");
  }finally{
    if(btn) btn.disabled = false;
  }
}
async function refreshState(){
  try{
    const res = await fetch('/api/state', {cache:'no-store'});
    if(!res.ok) return;
    let free = 0;
    for(const item of await res.json()){
      const el = document.getElementById('cell-' + item.num);
      if(!el) continue;
      const wasTaken = el.getAttribute('data-taken') === '1';
      if(item.taken){
        el.className = 'cell taken';
        el.setAttribute('data-taken','1');
        if(!wasTaken || el.getAttribute('data-name') !== item.name){ el.innerHTML = takenCell(item.num, item.name); }
        el.setAttribute('data-name', item.name || "");
      }else{
        free++;
        el.className = 'cell free';
        el.setAttribute('data-taken','0');
        el.setAttribute('data-name','');
        if(wasTaken){ el.innerHTML = freeCell(item.num); }
      }
    }
    const fc = document.getElementById('free-count');
    if(fc) fc.textContent = free.toString();
  }catch(e){}
}
setInterval(refreshState, 5000);
"#;

fn render_cell(out: &mut String, slot: &SlotState) {
    let num = &slot.num;
    if slot.taken {
        let name = escape_html(&slot.name);
        out.push_str(&format!(
            r#"<div class="cell taken" id="cell-{num}" data-num="{num}" data-taken="1" data-name="{name}"><div class="mono"><strong>{num}</strong></div><small>Ocupado por: {name}</small></div>"#
        ));
    } else {
        out.push_str(&format!(
            r#"<div class="cell free" id="cell-{num}" data-num="{num}" data-taken="0" data-name=""><div class="mono"><strong>{num}</strong></div><button class="pick" type="button" onclick="pickNumber('{num}', this)">Elegir</button></div>"#
        ));
    }
}

const ADMIN_PANEL: &str = r#"
<details open>
  <summary>Administración</summary>
  <p>Para liberar o reiniciar necesitás la clave de admin (<code>ADMIN_KEY</code>).</p>
  <form class="row" method="post" action="/release/00" onsubmit="this.action='/release/' + document.getElementById('numlib').value;">
    <input id="numlib" type="text" placeholder="Número (00–99)" pattern="\d\d" maxlength="2">
    <input name="key" type="text" placeholder="ADMIN_KEY">
    <button type="submit">Liberar</button>
  </form>
  <form class="row" method="post" action="/reset">
    <input name="key" type="text" placeholder="ADMIN_KEY">
    <button type="submit">Reiniciar todo</button>
  </form>
  <div class="row"><a href="/api/state">Ver estado (JSON)</a></div>
  <div class="row"><a href="/export.xlsx">Exportar a Excel</a></div>
  <div class="row"><a href="/export-occupied.xlsx">Exportar ocupados + total</a></div>
  <div class="row"><a href="/admin-logout">Cerrar panel</a></div>
</details>
"#;

/// Render the full board page.
pub fn render(ctx: &PageContext<'_>) -> String {
    let config = ctx.config;
    let title = escape_html(&config.title);
    let free_count = ctx.slots.iter().filter(|s| !s.taken).count();
    let (name_required, name_hint) = match config.name_policy {
        NamePolicy::Strict => ("1", "Tu nombre (obligatorio)"),
        NamePolicy::Lenient => ("0", "Tu nombre (opcional)"),
    };

    let mut out = String::with_capacity(32 * 1024);
    out.push_str(&format!(
        r#"<!doctype html>
<html lang="es">
<head>
<meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body data-name-required="{name_required}">
<div class="wrap">
  <h1>{title}</h1>
  <div class="banner">
    <span class="badge">Rifa</span>
    <div><div><strong>{prize}</strong></div><div>{date}</div></div>
  </div>
"#,
        prize = escape_html(&config.prize_text),
        date = escape_html(&config.date_text),
    ));

    if !config.bank_info.is_empty() {
        out.push_str(
            r#"  <div class="notice"><strong>Datos bancarios disponibles</strong> <button type="button" onclick="openBankModal()">Ver datos bancarios</button> <button type="button" onclick="copyBankInfo()">Copiar</button></div>
"#,
        );
    }

    if let Some(msg) = ctx.error_msg {
        out.push_str(&format!(
            "  <div class=\"notice warn\">{}</div>\n",
            escape_html(msg)
        ));
    }

    out.push_str(&format!(
        r#"  <div class="meta">Números libres: <strong id="free-count">{free_count}</strong> / 100</div>
  <div class="topbar">
    <input id="nombre" type="text" placeholder="{name_hint}" />
    <button onclick="share()">Compartir enlace</button>
    <input id="adminKeyForDownload" type="text" placeholder="ADMIN_KEY para descargar Excel" />
    <button onclick="downloadExport('/export.xlsx')">Exportar Excel</button>
    <button onclick="downloadExport('/export-occupied.xlsx')">Exportar ocupados + total</button>
  </div>
  <div class="grid" id="grid">
"#
    ));

    for slot in ctx.slots {
        render_cell(&mut out, slot);
        out.push('\n');
    }
    out.push_str("  </div>\n");

    if ctx.show_admin {
        out.push_str(ADMIN_PANEL);
    }

    out.push_str("</div>\n");

    if !config.bank_info.is_empty() {
        out.push_str(&format!(
            r#"<div id="bankModal" class="modal-backdrop" role="dialog" aria-modal="true" aria-labelledby="bankTitle">
  <div class="modal">
    <h2 id="bankTitle">Datos bancarios</h2>
    <p id="bankText">{}</p>
    <div class="actions">
      <button class="ghost" type="button" onclick="closeBankModal()">Cerrar</button>
      <button type="button" onclick="copyBankInfo()">Copiar</button>
    </div>
  </div>
</div>
"#,
            escape_html(&config.bank_info)
        ));
    }

    out.push_str("<script>");
    out.push_str(SCRIPT);
    out.push_str("</script>\n</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots() -> Vec<SlotState> {
        (0..100u8)
            .map(|id| SlotState {
                id,
                num: format!("{id:02}"),
                taken: id == 7,
                name: if id == 7 {
                    "<Ana>".to_string()
                } else {
                    String::new()
                },
            })
            .collect()
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn renders_every_cell_and_free_count() {
        let config = RaffleConfig::default();
        let slots = slots();
        let html = render(&PageContext {
            config: &config,
            slots: &slots,
            show_admin: false,
            error_msg: None,
        });
        assert_eq!(html.matches(r#"class="cell "#).count(), 100);
        assert!(html.contains(r#"<strong id="free-count">99</strong>"#));
        assert!(html.contains("Ocupado por: &lt;Ana&gt;"));
        assert!(!html.contains("<Ana>"));
        assert!(!html.contains("Administración"));
        assert!(html.contains("setInterval(refreshState, 5000)"));
    }

    #[test]
    fn admin_panel_and_notices_are_optional() {
        let config = RaffleConfig {
            bank_info: "CBU 0001".into(),
            ..Default::default()
        };
        let slots = slots();
        let html = render(&PageContext {
            config: &config,
            slots: &slots,
            show_admin: true,
            error_msg: Some("Escribí tu nombre para poder elegir."),
        });
        assert!(html.contains("Administración"));
        assert!(html.contains(r#"<p id="bankText">CBU 0001</p>"#));
        assert!(html.contains(r#"id="bankModal""#));
        assert!(html.contains("Escribí tu nombre para poder elegir."));
    }

    fn render_with(policy: NamePolicy) -> String {
        let config = RaffleConfig {
            name_policy: policy,
            ..Default::default()
        };
        let slots = slots();
        render(&PageContext {
            config: &config,
            slots: &slots,
            show_admin: false,
            error_msg: None,
        })
    }

    #[test]
    fn strict_policy_page_requires_a_name() {
        let html = render_with(NamePolicy::Strict);
        assert!(html.contains(r#"<body data-name-required="1">"#));
        assert!(html.contains(r#"placeholder="Tu nombre (obligatorio)""#));
        assert!(html.contains("if(!name && nameRequired)"));
    }

    #[test]
    fn lenient_policy_page_lets_an_empty_name_through() {
        let html = render_with(NamePolicy::Lenient);
        assert!(html.contains(r#"<body data-name-required="0">"#));
        assert!(!html.contains("(obligatorio)"));
        assert!(html.contains(r#"placeholder="Tu nombre (opcional)""#));
        // The only client-side name check is gated on the body flag.
        assert!(!html.contains("if(!name){"));
    }

    #[test]
    fn bank_modal_only_with_bank_info() {
        let html = render_with(NamePolicy::Strict);
        assert!(!html.contains(r#"id="bankModal""#));
        assert!(html.contains("Compartir enlace"));
        assert!(html.contains("get('bank') === '1'"));
    }
}
