//! End-to-end resolution scenarios over an in-memory fetcher.

use std::io::{Cursor, Write};

use blobstage::prelude::*;
use blobstage::resolve::fetch::Payload;
use blobstage::Error;
use zip::write::SimpleFileOptions;

/// Fetcher serving a single canned payload or error.
enum Canned {
    Payload(Payload),
    Status(u16),
}

impl BlobFetcher for Canned {
    fn fetch(&self, _id: &ContentId) -> blobstage::Result<Payload> {
        match self {
            Canned::Payload(payload) => Ok(payload.clone()),
            Canned::Status(status) => Err(Error::Fetch { status: *status }),
        }
    }
}

fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, bytes) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn full_build_zip() -> Vec<u8> {
    build_zip(&[
        ("Foo.Build.loader.js", b"loader source"),
        ("Foo.Build.data.gz", b"data bytes"),
        ("Foo.Build.framework.js.gz", b"framework source"),
        ("Foo.Build.wasm.gz", b"wasm bytes"),
        ("readme.txt", b"unrelated"),
    ])
}

#[test]
fn full_build_classifies_as_game_with_typed_handles() {
    let fetcher = Canned::Payload(Payload::new(full_build_zip()));
    let registry = UrlRegistry::new();
    let id = ContentId::new("abc123").unwrap();

    let classification = resolve(&fetcher, &registry, &id).unwrap();
    let assets = match classification {
        Classification::Game(assets) => assets,
        other => panic!("expected game, got {other:?}"),
    };

    assert_eq!(assets.get(BuildSlot::Loader).content_type(), "application/javascript");
    assert_eq!(
        assets.get(BuildSlot::Data).content_type(),
        "application/octet-stream; encoding=gzip"
    );
    assert_eq!(
        assets.get(BuildSlot::Framework).content_type(),
        "application/javascript; encoding=gzip"
    );
    assert_eq!(assets.get(BuildSlot::Code).content_type(), "application/wasm; encoding=gzip");

    // Four live handles, each resolvable back to its raw (undecoded) bytes.
    assert_eq!(registry.len(), 4);
    let stored = registry.get(assets.get(BuildSlot::Loader).url()).unwrap();
    assert_eq!(&stored.bytes[..], b"loader source");

    drop(assets);
    assert!(registry.is_empty());
}

#[test]
fn incomplete_build_falls_back_to_image() {
    // Valid archive, loader missing: never a partial game classification.
    let bytes = build_zip(&[
        ("Foo.Build.data.gz", b"data"),
        ("Foo.Build.framework.js.gz", b"framework"),
        ("Foo.Build.wasm.gz", b"wasm"),
    ]);
    let fetcher = Canned::Payload(Payload::new(bytes));
    let registry = UrlRegistry::new();
    let id = ContentId::new("abc123").unwrap();

    let classification = resolve(&fetcher, &registry, &id).unwrap();
    assert!(matches!(classification, Classification::Image(_)));
    assert_eq!(registry.len(), 1);
}

#[test]
fn png_payload_classifies_as_image_with_declared_type() {
    let png = b"\x89PNG\r\n\x1a\n0123456789".to_vec();
    let fetcher = Canned::Payload(Payload::with_type(png.clone(), "image/png"));
    let registry = UrlRegistry::new();
    let id = ContentId::new("abc123").unwrap();

    match resolve(&fetcher, &registry, &id).unwrap() {
        Classification::Image(handle) => {
            assert_eq!(handle.content_type(), "image/png");
            let stored = registry.get(handle.url()).unwrap();
            assert_eq!(&stored.bytes[..], &png[..]);
        }
        other => panic!("expected image, got {other:?}"),
    }
}

#[test]
fn png_payload_without_declared_type_is_sniffed() {
    let fetcher = Canned::Payload(Payload::new(b"\x89PNG\r\n\x1a\n0123456789".to_vec()));
    let registry = UrlRegistry::new();
    let id = ContentId::new("abc123").unwrap();

    match resolve(&fetcher, &registry, &id).unwrap() {
        Classification::Image(handle) => assert_eq!(handle.content_type(), "image/png"),
        other => panic!("expected image, got {other:?}"),
    }
}

#[test]
fn truncated_archive_falls_back_to_image_not_error() {
    let mut bytes = full_build_zip();
    bytes.truncate(bytes.len() / 3);
    let fetcher = Canned::Payload(Payload::new(bytes));
    let registry = UrlRegistry::new();
    let id = ContentId::new("abc123").unwrap();

    // Archive corruption is swallowed, by design: the payload displays as
    // an opaque image and no error reaches the caller.
    let classification = resolve(&fetcher, &registry, &id).unwrap();
    assert!(matches!(classification, Classification::Image(_)));
}

#[test]
fn http_404_surfaces_fetch_error_with_status() {
    let fetcher = Canned::Status(404);
    let registry = UrlRegistry::new();
    let id = ContentId::new("abc123").unwrap();

    let err = resolve(&fetcher, &registry, &id).unwrap_err();
    assert!(matches!(err, Error::Fetch { status: 404 }));
    assert!(err.to_string().contains("404"));
    assert!(registry.is_empty());
}

#[test]
fn repeated_resolution_shares_nothing() {
    let fetcher = Canned::Payload(Payload::new(full_build_zip()));
    let registry = UrlRegistry::new();
    let id = ContentId::new("abc123").unwrap();

    let first = resolve(&fetcher, &registry, &id).unwrap();
    let second = resolve(&fetcher, &registry, &id).unwrap();
    assert_eq!(registry.len(), 8);

    // Releasing one attempt leaves the other fully live.
    drop(first);
    assert_eq!(registry.len(), 4);
    if let Classification::Game(assets) = &second {
        assert!(registry.get(assets.get(BuildSlot::Loader).url()).is_some());
    }
    drop(second);
    assert!(registry.is_empty());
}

#[test]
fn resolved_game_drives_bootstrap_config() {
    use blobstage::bootstrap::RuntimeConfig;

    let fetcher = Canned::Payload(Payload::new(full_build_zip()));
    let registry = UrlRegistry::new();
    let id = ContentId::new("abc123").unwrap();

    let assets = match resolve(&fetcher, &registry, &id).unwrap() {
        Classification::Game(assets) => assets,
        other => panic!("expected game, got {other:?}"),
    };

    let config = RuntimeConfig::new(&assets, &Settings::default(), "Orbit Runner");
    assert_eq!(config.data_url, assets.get(BuildSlot::Data).url());
    assert_eq!(config.framework_url, assets.get(BuildSlot::Framework).url());
    assert_eq!(config.code_url, assets.get(BuildSlot::Code).url());
    assert_eq!(config.product_name, "Orbit Runner");
}
