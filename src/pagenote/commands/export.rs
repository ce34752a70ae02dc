use crate::commands::{CmdMessage, CmdResult};
use crate::editor::markdown::blocks_to_markdown;
use crate::error::{PagenoteError, Result};
use crate::model::Page;
use crate::store::{PageStore, StorageBackend};
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

pub fn run<B: StorageBackend>(store: &PageStore<B>, output: Option<PathBuf>) -> Result<CmdResult> {
    if store.is_empty() {
        let mut res = CmdResult::default();
        res.add_message(CmdMessage::info("No pages to export."));
        return Ok(res);
    }

    let path = output.unwrap_or_else(|| {
        let now = Utc::now();
        PathBuf::from(format!("pagenote-{}.tar.gz", now.format("%Y-%m-%d_%H-%M-%S")))
    });
    let file = File::create(&path).map_err(PagenoteError::Io)?;
    write_archive(file, store.pages())?;

    let mut result = CmdResult::default().with_output_path(path.clone());
    result.add_message(CmdMessage::success(format!(
        "Exported {} page(s) to {}",
        store.len(),
        path.display()
    )));
    Ok(result)
}

fn append<W: Write>(tar: &mut tar::Builder<W>, name: &str, data: &[u8]) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    tar.append_data(&mut header, name, data)
        .map_err(PagenoteError::Io)
}

fn write_archive<W: Write>(writer: W, pages: &[Page]) -> Result<()> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);

    let collection = serde_json::to_string_pretty(pages).map_err(PagenoteError::Serialization)?;
    append(&mut tar, "pagenote/pages.json", collection.as_bytes())?;

    for (i, page) in pages.iter().enumerate() {
        let name = format!(
            "pagenote/{:02}-{}.md",
            i + 1,
            sanitize_filename(&page.title)
        );
        let body = blocks_to_markdown(&page.content);
        let content = format!("# {}\n\n{}", page.title, body);
        append(&mut tar, &name, content.as_bytes())?;
    }

    let enc = tar.into_inner().map_err(PagenoteError::Io)?;
    enc.finish().map_err(PagenoteError::Io)?;
    Ok(())
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}
