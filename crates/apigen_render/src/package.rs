//! Bundle packaging: zip archive or on-disk directory tree.

use crate::bundle::{BundleFile, RenderedBundle, BUNDLE_ROOT};
use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::io::{Cursor, Write};
use std::path::{Component, Path};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Rejects paths that are absolute, climb with `..` or leave the bundle root.
fn checked_path(file: &BundleFile) -> Result<&Path> {
    let path = Path::new(&file.path);
    let mut components = path.components();
    let rooted = components.next() == Some(Component::Normal(OsStr::new(BUNDLE_ROOT)));
    if rooted
        && components.all(|c| matches!(c, Component::Normal(_)))
        && !file.path.contains('\\')
    {
        Ok(path)
    } else {
        Err(Error::UnsafePath(file.path.clone()))
    }
}

/// Serializes a bundle into a zip archive.
///
/// Entries carry a fixed timestamp, so the same bundle always produces the
/// same bytes.
///
/// # Errors
///
/// Returns an error if a file path leaves the bundle root or the archive
/// cannot be written.
pub fn package(bundle: &RenderedBundle) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    for file in bundle.files() {
        checked_path(file)?;
        writer.start_file(file.path.as_str(), options)?;
        writer.write_all(file.contents.as_bytes())?;
    }

    let bytes = writer.finish()?.into_inner();
    debug!(
        proxy = bundle.proxy_name(),
        files = bundle.files().len(),
        bytes = bytes.len(),
        "packaged bundle"
    );
    Ok(bytes)
}

/// Writes the bundle as a directory tree under `dir`.
///
/// # Errors
///
/// Returns an error if a file path leaves the bundle root or a directory or
/// file cannot be created. Paths are checked before anything is written.
pub fn write_tree(bundle: &RenderedBundle, dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    let paths = bundle
        .files()
        .iter()
        .map(|file| checked_path(file).map(|path| (dir.join(path), file)))
        .collect::<Result<Vec<_>>>()?;

    for (path, file) in paths {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &file.contents)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render;
    use std::io::Read;
    use zip::ZipArchive;

    const REQUEST: &str = "Create a proxy named profile pointing to https://profile.example.com \
        with spike arrest 5ps and javascript to combine firstName and lastName";

    #[test]
    fn archive_contains_every_rendered_file() {
        let bundle = render(&apigen_intent::extract(REQUEST), REQUEST);
        let bytes = package(&bundle).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), bundle.files().len());

        for file in bundle.files() {
            let mut entry = archive.by_name(&file.path).unwrap();
            let mut contents = String::new();
            entry.read_to_string(&mut contents).unwrap();
            assert_eq!(contents, file.contents);
        }

        let mut spike = archive
            .by_name("apiproxy/policies/SpikeArrest.xml")
            .unwrap();
        let mut xml = String::new();
        spike.read_to_string(&mut xml).unwrap();
        assert!(xml.contains("<Rate>5ps</Rate>"));
    }

    #[test]
    fn packaging_is_reproducible() {
        let bundle = render(&apigen_intent::extract(REQUEST), REQUEST);
        assert_eq!(package(&bundle).unwrap(), package(&bundle).unwrap());
    }

    #[test]
    fn traversal_names_are_never_written() {
        let mut descriptor = apigen_intent::extract(REQUEST);
        descriptor.name = "../../escaped".to_string();
        descriptor
            .policies
            .insert(apigen_intent::PolicyKind::Other("../../../pwn".to_string()));
        let bundle = render(&descriptor, REQUEST);

        assert!(matches!(package(&bundle), Err(Error::UnsafePath(_))));

        let root = std::env::temp_dir().join(format!("apigen-escape-{}", std::process::id()));
        let dir = root.join("out");
        assert!(matches!(
            write_tree(&bundle, &dir),
            Err(Error::UnsafePath(_))
        ));
        assert!(!root.join("escaped.xml").exists());
        assert!(!dir.exists());
    }

    #[test]
    fn tree_mirrors_archive_layout() {
        let bundle = render(&apigen_intent::extract(REQUEST), REQUEST);
        let dir = std::env::temp_dir().join(format!("apigen-tree-{}", std::process::id()));

        write_tree(&bundle, &dir).unwrap();
        let js = std::fs::read_to_string(dir.join("apiproxy/resources/jsc/transformation.js"))
            .unwrap();
        assert!(js.starts_with("// Combine firstName and lastName"));
        assert!(dir.join("apiproxy/profile.xml").is_file());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
