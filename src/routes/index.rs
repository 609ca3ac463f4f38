//! Upload page

use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Blind OCR</title>
</head>
<body>
  <main>
    <h1>Blind OCR</h1>
    <section>
      <h2>PDF</h2>
      <form action="/ocr/pdf" method="post" enctype="multipart/form-data">
        <label for="pdf-file">PDF file</label>
        <input id="pdf-file" type="file" name="file" accept="application/pdf,.pdf" required>
        <button type="submit">Extract text</button>
      </form>
    </section>
    <section>
      <h2>Image</h2>
      <form action="/ocr/image" method="post" enctype="multipart/form-data">
        <label for="image-file">Image file</label>
        <input id="image-file" type="file" name="file" accept="image/*" required>
        <button type="submit">Extract text</button>
      </form>
    </section>
  </main>
</body>
</html>
"#;
