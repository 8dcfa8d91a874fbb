use crate::{Collection, Document};
use anyhow::{Context, Result};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

/// Write the collection as a JSON array, derived term sequences included.
pub fn save_collection<P: AsRef<Path>>(path: P, collection: &Collection) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer(&mut w, collection.documents())?;
    w.flush()?;
    tracing::info!(path = %path.display(), num_docs = collection.len(), "saved collection");
    Ok(())
}

/// Load a collection saved by [`save_collection`]. A missing file yields an empty collection.
pub fn load_collection<P: AsRef<Path>>(path: P) -> Result<Collection> {
    let path = path.as_ref();
    let f = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "no collection found, starting with an empty one");
            return Ok(Collection::empty());
        }
        Err(e) => return Err(e).with_context(|| format!("opening {}", path.display())),
    };
    let docs: Vec<Document> = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parsing {}", path.display()))?;
    let collection = Collection::new(docs)?;
    tracing::info!(path = %path.display(), num_docs = collection.len(), "loaded collection");
    Ok(collection)
}
