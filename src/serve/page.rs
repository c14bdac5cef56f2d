//! Single-page front end for the map server.

/// Campus selector, radius slider, map preview and download links
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>School Construction Impact Map Generator</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 0; display: flex; height: 100vh; }
  aside { width: 300px; padding: 1rem; background: #f4f4f4; box-sizing: border-box; }
  main { flex: 1; display: flex; flex-direction: column; padding: 1rem; box-sizing: border-box; }
  h1 { font-size: 1.3rem; margin-top: 0; }
  label { display: block; margin-top: 1rem; font-weight: 600; }
  select, input[type=range], button { width: 100%; margin-top: .4rem; }
  iframe { flex: 1; border: 1px solid #ccc; width: 100%; min-height: 500px; }
  #downloads a { margin-right: 1rem; }
  #info { color: #555; margin: .5rem 0; min-height: 1.2em; }
  #error { color: #b00020; }
</style>
</head>
<body>
<aside>
  <h1>Map Settings</h1>
  <label for="campus">Select a school campus</label>
  <select id="campus"></select>
  <label for="radius">Impact radius: <span id="radius-value"></span> m</label>
  <input id="radius" type="range">
  <label><button id="generate" type="button">Generate map</button></label>
</aside>
<main>
  <h1>School Construction Impact Map Generator</h1>
  <div id="error"></div>
  <iframe id="preview" title="Impact map"></iframe>
  <div id="downloads" hidden>
    <a id="dl-html" href="#">Download HTML map</a>
    <a id="dl-static" href="#">Download static PNG</a>
    <a id="dl-png" href="#">Download PNG</a>
  </div>
  <div id="info"></div>
</main>
<script>
const $ = (id) => document.getElementById(id);

function query(extra) {
  const params = new URLSearchParams({ label: $("campus").value, radius: $("radius").value });
  for (const [k, v] of Object.entries(extra || {})) params.set(k, v);
  return params.toString();
}

async function init() {
  const res = await fetch("/api/campuses");
  if (!res.ok) { $("error").textContent = await res.text(); return; }
  const data = await res.json();
  for (const label of data.campuses) {
    const opt = document.createElement("option");
    opt.value = opt.textContent = label;
    $("campus").appendChild(opt);
  }
  const r = $("radius");
  r.min = data.radius.min; r.max = data.radius.max;
  r.step = data.radius.step; r.value = data.radius.default;
  $("radius-value").textContent = r.value;
  r.addEventListener("input", () => { $("radius-value").textContent = r.value; });
}

async function generate() {
  $("error").textContent = "";
  $("info").textContent = "";
  const res = await fetch("/api/map?" + query());
  if (!res.ok) {
    $("error").textContent = await res.text();
    $("downloads").hidden = true;
    return;
  }
  $("preview").srcdoc = await res.text();
  $("dl-html").href = "/api/map?" + query({ download: "true" });
  $("dl-static").href = "/api/static?" + query({ download: "true" });
  $("downloads").hidden = false;
}

$("dl-png").addEventListener("click", async (ev) => {
  ev.preventDefault();
  $("info").textContent = "Capturing PNG...";
  const res = await fetch("/api/map.png?" + query());
  if (!res.ok) { $("info").textContent = await res.text(); return; }
  const url = URL.createObjectURL(await res.blob());
  const a = document.createElement("a");
  const disposition = res.headers.get("Content-Disposition") || "";
  const match = disposition.match(/filename="([^"]+)"/);
  a.href = url;
  a.download = match ? match[1] : "map.png";
  a.click();
  URL.revokeObjectURL(url);
  $("info").textContent = "";
});

$("generate").addEventListener("click", generate);
init();
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_wires_api_routes() {
        for route in ["/api/campuses", "/api/map?", "/api/static?", "/api/map.png?"] {
            assert!(INDEX_HTML.contains(route), "missing {}", route);
        }
        assert!(INDEX_HTML.contains("id=\"campus\""));
        assert!(INDEX_HTML.contains("type=\"range\""));
    }
}
