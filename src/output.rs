use mongodb::bson::{self, Bson, Document};
use serde::Serialize;

/// Print a blank line, `header:` and the value as pretty JSON on stdout.
pub fn print_section<T: Serialize + ?Sized>(header: &str, value: &T) {
    println!("\n{}:", header);
    match render(value) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::warn!("Could not render '{}' as JSON: {}", header, e),
    }
}

/// Render through BSON so stored documents print with every field they carry.
pub fn render<T: Serialize + ?Sized>(value: &T) -> Result<String, bson::ser::Error> {
    let json = bson::to_bson(value)?.into_relaxed_extjson();
    let pretty = serde_json::to_string_pretty(&json);
    Ok(pretty.unwrap_or_else(|_| json.to_string()))
}

/// Relaxed extended JSON, so numbers print as plain numbers.
pub fn document_to_json(document: &Document) -> serde_json::Value {
    Bson::Document(document.clone()).into_relaxed_extjson()
}
