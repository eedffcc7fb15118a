use super::NewWord;
use crate::error::CatalogError;
use include_dir::{include_dir, Dir};
use std::io;

static STARTER_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/starter");

const STARTER_FILE: &str = "words.json";

/// The bundled starter word list, six levels of everyday vocabulary.
pub fn starter_words() -> Result<Vec<NewWord>, CatalogError> {
    let file = STARTER_DIR.get_file(STARTER_FILE).ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "starter word list not bundled")
    })?;

    let contents = file.contents_utf8().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, "starter word list is not utf-8")
    })?;

    Ok(serde_json::from_str(contents)?)
}
