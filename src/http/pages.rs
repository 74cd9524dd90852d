//! HTML rendering for the catalog views. Plain string assembly, no
//! template engine.

use crate::catalog::FileEntry;
use crate::http::SiteContext;

const LANDING_STYLE: &str = "\
body, html { margin: 0; padding: 0; height: 100%; display: flex; justify-content: center; align-items: center; background: #f0f0f0; font-family: Arial, sans-serif; }
.container { display: flex; flex-direction: column; align-items: center; background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); max-width: 90%; }
h1 { color: #333; text-align: center; margin: 0 0 20px 0; }
.qr-code { max-width: 80%; height: auto; margin-top: 20px; }
.btn { display: inline-block; margin-top: 10px; padding: 10px 15px; background-color: #007BFF; color: white; text-decoration: none; border-radius: 5px; text-align: center; }
.btn:hover { background-color: #0056b3; }
.gear { position: absolute; bottom: 20px; right: 20px; color: black; text-decoration: none; }";

const LIST_STYLE: &str = "\
body { font-family: Arial, sans-serif; background: #f0f0f0; padding: 20px; }
.container { background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
ul { list-style: none; padding: 0; }
li { margin: 15px 0; padding: 10px; background: #f9f9f9; border-radius: 5px; display: flex; align-items: center; justify-content: space-between; }
li.selected { background: #e0e0e0; }
.btn { padding: 5px 10px; background-color: #007BFF; color: white; text-decoration: none; border-radius: 5px; margin-right: 10px; }
.btn:hover { background-color: #0056b3; }
.qr-code { width: 100px; margin-left: 10px; }";

const MANAGE_STYLE: &str = "\
body { font-family: Arial, sans-serif; background: #f0f0f0; padding: 20px; }
.container { background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
table { width: 100%; border-collapse: collapse; }
th, td { padding: 10px; text-align: left; border-bottom: 1px solid #ddd; }
th { background-color: #007BFF; color: white; }
button { background-color: #dc3545; color: white; border: none; padding: 5px 10px; border-radius: 5px; cursor: pointer; }
button:hover { background-color: #c82333; }";

const MANAGE_SCRIPT: &str = r#"
function getAuthHeader() {
  const secret = document.getElementById('secret').value;
  return secret ? { 'x-auth-bearer': secret } : {};
}

document.getElementById('upload-form').onsubmit = async function(event) {
  event.preventDefault();
  const formData = new FormData();
  formData.append('file', event.target.file.files[0]);
  formData.append('displayName', document.getElementById('display-name').value);
  await fetch('/manage/upload', { method: 'POST', body: formData, headers: getAuthHeader() });
  location.reload();
}

async function removeFile(filename) {
  await fetch('/manage/remove', {
    method: 'POST',
    body: JSON.stringify({ filename }),
    headers: { 'Content-Type': 'application/json', ...getAuthHeader() },
  });
  location.reload();
}

async function replaceFile(filename, newFile) {
  const formData = new FormData();
  formData.append('newFile', newFile);
  formData.append('filename', filename);
  await fetch('/manage/replace', { method: 'POST', body: formData, headers: getAuthHeader() });
  location.reload();
}

async function updateSelected(filename) {
  await fetch('/manage/select', {
    method: 'POST',
    body: JSON.stringify({ filename }),
    headers: { 'Content-Type': 'application/json', ...getAuthHeader() },
  });
  location.reload();
}
"#;

pub(crate) fn landing(selected: Option<&FileEntry>, site: &SiteContext) -> String {
    let main = match selected {
        Some(entry) => {
            let url = download_url(site, &entry.filename);
            format!(
                "<h1>{name}</h1>\n\
                 <p style=\"margin:0;padding:0;color:gray\">Scan code to download</p>\n\
                 <img class=\"qr-code\" src=\"{qr}\" alt=\"QR Code\"/>\n\
                 <a class=\"btn\" href=\"{href}\">Download</a>",
                name = escape(&entry.name),
                qr = escape(&qr_url(&url)),
                href = escape(&url),
            )
        }
        None => "<h1>No file selected</h1>".to_string(),
    };

    format!(
        "<html>\n<head>\n<title>File Shelf</title>\n<style>{LANDING_STYLE}</style>\n</head>\n\
         <body>\n<div class=\"container\">\n{main}\n\
         <a class=\"btn\" href=\"/all\">View All Files</a>\n</div>\n\
         <a class=\"gear\" href=\"/manage\" title=\"Manage Uploads\">&#9881;</a>\n\
         </body>\n</html>"
    )
}

pub(crate) fn all_files(entries: &[FileEntry], site: &SiteContext) -> String {
    let items: String = entries
        .iter()
        .map(|entry| {
            let url = download_url(site, &entry.filename);
            format!(
                "<li{class}><span><b>{name}</b> - Uploaded on {date}</span>\
                 <a class=\"btn\" href=\"{href}\">Download</a>\
                 <img class=\"qr-code\" src=\"{qr}\" alt=\"QR Code\"/></li>\n",
                class = if entry.selected { " class=\"selected\"" } else { "" },
                name = escape(&entry.name),
                date = entry.upload_date.format("%Y-%m-%d %H:%M UTC"),
                href = escape(&url),
                qr = escape(&qr_url(&url)),
            )
        })
        .collect();

    format!(
        "<html>\n<head>\n<title>All Files - File Shelf</title>\n<style>{LIST_STYLE}</style>\n</head>\n\
         <body>\n<div class=\"container\">\n\
         <a class=\"btn\" href=\"/\">Back to Current</a>\n\
         <ul>\n{items}</ul>\n</div>\n</body>\n</html>"
    )
}

pub(crate) fn manage(entries: &[FileEntry]) -> String {
    let rows: String = entries
        .iter()
        .map(|entry| {
            let filename = escape(&entry.filename);
            format!(
                "<tr><td>{name}</td>\
                 <td><input type=\"radio\" name=\"selected\"{checked} onchange=\"updateSelected('{filename}')\"></td>\
                 <td><button onclick=\"removeFile('{filename}')\">Remove</button></td>\
                 <td><input type=\"file\" onchange=\"replaceFile('{filename}', this.files[0])\"></td></tr>\n",
                name = escape(&entry.name),
                checked = if entry.selected { " checked" } else { "" },
            )
        })
        .collect();

    format!(
        "<html>\n<head>\n<title>Manage Files - File Shelf</title>\n<style>{MANAGE_STYLE}</style>\n</head>\n\
         <body>\n<div class=\"container\">\n\
         <label for=\"secret\">Secret:</label>\n\
         <input type=\"password\" id=\"secret\" placeholder=\"Enter secret\"/>\n\
         <table>\n<tr><th>Name</th><th>Selected</th><th>Remove</th><th>Replace</th></tr>\n{rows}</table>\n\
         <form id=\"upload-form\" enctype=\"multipart/form-data\">\n\
         <input type=\"text\" id=\"display-name\" placeholder=\"Enter display name\" required />\n\
         <input type=\"file\" name=\"file\" required />\n\
         <button type=\"submit\">Upload</button>\n\
         </form>\n</div>\n<script>{MANAGE_SCRIPT}</script>\n</body>\n</html>"
    )
}

fn download_url(site: &SiteContext, filename: &str) -> String {
    format!(
        "{}/files/{}",
        site.public_base_url.trim_end_matches('/'),
        filename
    )
}

fn qr_url(target: &str) -> String {
    format!("https://api.qrserver.com/v1/create-qr-code/?data={target}")
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
