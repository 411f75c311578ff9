use axum::response::Html;

const STYLE: &str = "body{font-family:system-ui,sans-serif;background:#f9fafb;margin:0;padding:2rem}\
main{max-width:56rem;margin:0 auto;background:#fff;border:1px solid #e5e7eb;border-radius:8px;padding:1.5rem}\
pre{background:#f3f4f6;border-radius:6px;padding:1rem;white-space:pre-wrap;overflow:auto}";

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title}</title><style>{STYLE}</style></head>\
         <body><main>{body}</main></body></html>\n"
    ))
}

pub fn paste(content: &str) -> Html<String> {
    layout(
        "Paste",
        &format!("<h1>Paste Content</h1><pre>{}</pre>", escape_html(content)),
    )
}

pub fn not_found() -> Html<String> {
    layout(
        "Paste not found",
        "<h1>Paste not found</h1>\
         <p>This paste does not exist, has expired, or has reached its view limit.</p>\
         <p><a href=\"/\">Create a new paste</a></p>",
    )
}

pub fn index() -> Html<String> {
    layout(
        "pastelite",
        r#"<h1>New paste</h1>
<form id="f">
<p><textarea name="content" rows="12" style="width:100%" required></textarea></p>
<p><label>TTL (seconds) <input name="ttl_seconds" type="number" min="1"></label>
<label>Max views <input name="max_views" type="number" min="1"></label></p>
<p><button type="submit">Create</button></p>
</form>
<p id="out"></p>
<script>
document.getElementById("f").addEventListener("submit", async (ev) => {
  ev.preventDefault();
  const data = new FormData(ev.target);
  const body = { content: data.get("content") };
  for (const k of ["ttl_seconds", "max_views"]) {
    if (data.get(k)) body[k] = Number(data.get(k));
  }
  const res = await fetch("/api/pastes", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify(body),
  });
  const json = await res.json();
  const out = document.getElementById("out");
  out.textContent = res.ok ? json.url : json.error;
});
</script>"#,
    )
}

/// Escapa texto para dentro de elementos HTML.
pub fn escape_html(s: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x&y")</script>"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn paste_page_embeds_escaped_content() {
        let Html(body) = paste("<b>hi</b>\nthere");
        assert!(body.contains("<pre>&lt;b&gt;hi&lt;/b&gt;\nthere</pre>"));
        assert!(!body.contains("<b>hi</b>"));
    }

    #[test]
    fn not_found_page_is_generic() {
        let Html(body) = not_found();
        assert!(body.contains("Paste not found"));
    }
}
