use eml_forensics::*;
use std::fs;
use std::path::{Path, PathBuf};

const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";
const EMPTY_SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
const EMPTY_SHA512: &str = "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
                            47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e";

const ABC_MD5: &str = "900150983cd24fb0d6963f7d28e17f72";
const ABC_SHA1: &str = "a9993e364706816aba3e25717850c26c9cd0d89d";
const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
const ABC_SHA512: &str = "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
                          2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f";

fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

// --- Attachment ---

#[test]
fn test_name_is_basename() {
    let attachment = Attachment::new("/tmp/extracted/invoice.pdf");

    assert_eq!(attachment.name(), "invoice.pdf");
    assert_eq!(attachment.path(), Path::new("/tmp/extracted/invoice.pdf"));
    assert_eq!(attachment.to_string(), "invoice.pdf");
}

#[test]
fn test_empty_file_digests_match_reference_vectors() {
    let dir = tempfile::tempdir().unwrap();
    let attachment = Attachment::new(write_file(dir.path(), "empty.bin", b""));

    assert_eq!(attachment.md5().unwrap(), EMPTY_MD5);
    assert_eq!(attachment.sha1().unwrap(), EMPTY_SHA1);
    assert_eq!(attachment.sha256().unwrap(), EMPTY_SHA256);
    assert_eq!(attachment.sha512().unwrap(), EMPTY_SHA512);
}

#[test]
fn test_streaming_digests_match_reference_vectors() {
    let engine = StreamingDigest::default();

    let empty = engine.digest_reader(&b""[..]).unwrap();
    assert_eq!(empty.md5, EMPTY_MD5);
    assert_eq!(empty.sha1, EMPTY_SHA1);
    assert_eq!(empty.sha256, EMPTY_SHA256);
    assert_eq!(empty.sha512, EMPTY_SHA512);

    let abc = engine.digest_reader(&b"abc"[..]).unwrap();
    assert_eq!(abc.md5, ABC_MD5);
    assert_eq!(abc.sha1, ABC_SHA1);
    assert_eq!(abc.sha256, ABC_SHA256);
    assert_eq!(abc.sha512, ABC_SHA512);
}

#[test]
fn test_digests_are_deterministic_across_chunk_sizes() {
    let dir = tempfile::tempdir().unwrap();
    let contents: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    let attachment = Attachment::new(write_file(dir.path(), "blob.bin", &contents));

    let tiny = ExtractorConfig {
        read_buffer_size: 7,
        ..ExtractorConfig::default()
    };
    let first = AttachmentIdentifier::new(&ExtractorConfig::default())
        .digests(&attachment)
        .unwrap();
    let second = AttachmentIdentifier::new(&tiny).digests(&attachment).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.md5, attachment.md5().unwrap());
    assert_eq!(first.sha512, attachment.sha512().unwrap());
}

#[test]
fn test_single_algorithm_digest_honors_buffer_size() {
    let tiny = StreamingDigest::new(&ExtractorConfig {
        read_buffer_size: 2,
        ..ExtractorConfig::default()
    });

    let md5 = tiny.hexdigest_reader::<md5::Md5, _>(&b"abc"[..]).unwrap();
    let sha512 = tiny.hexdigest_reader::<sha2::Sha512, _>(&b"abc"[..]).unwrap();

    assert_eq!(md5, ABC_MD5);
    assert_eq!(sha512, ABC_SHA512);
    assert_eq!(tiny.digest_reader(&b"abc"[..]).unwrap().md5, md5);
}

#[test]
fn test_digests_reflect_current_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "changing.txt", b"");
    let attachment = Attachment::new(&path);

    assert_eq!(attachment.md5().unwrap(), EMPTY_MD5);
    fs::write(&path, b"abc").unwrap();
    assert_eq!(attachment.md5().unwrap(), ABC_MD5);
}

// --- Records ---

#[test]
fn test_record_combines_digests_and_type() {
    let dir = tempfile::tempdir().unwrap();
    let attachment = Attachment::new(write_file(dir.path(), "abc.txt", b"abc"));

    let record = attachment.to_record().unwrap();
    let map = record.to_map();

    assert_eq!(map["name"], "abc.txt");
    assert_eq!(map["md5"], ABC_MD5);
    assert_eq!(map["sha1"], ABC_SHA1);
    assert_eq!(map["sha256"], ABC_SHA256);
    assert_eq!(map["sha512"], ABC_SHA512);
    assert_eq!(map["mime_type"], "text/plain");
    assert_eq!(map["encoding"], "us-ascii");
    assert_eq!(map.len(), 7);
}

#[test]
fn test_record_serializes_flat() {
    let dir = tempfile::tempdir().unwrap();
    let attachment = Attachment::new(write_file(dir.path(), "doc.pdf", b"%PDF-1.4\n\xe2\xe3\xcf\xd3\n"));
    let record = attachment.to_record().unwrap();

    let value: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
    assert_eq!(value["mime_type"], "application/pdf");
    assert_eq!(value["encoding"], "binary");
    assert_eq!(value["name"], "doc.pdf");

    let derived = serde_json::to_value(&record).unwrap();
    assert_eq!(derived, value);
}

// --- Failure isolation ---

#[test]
fn test_missing_file_fails_digest_and_sniff() {
    let dir = tempfile::tempdir().unwrap();
    let attachment = Attachment::new(dir.path().join("gone.bin"));
    let identifier = AttachmentIdentifier::new(&ExtractorConfig::default());

    assert!(identifier.digests(&attachment).unwrap_err().is_attachment_read_error());
    assert!(identifier.sniff(&attachment).unwrap_err().is_attachment_read_error());
    assert!(attachment.md5().unwrap_err().is_attachment_read_error());
    assert!(attachment.mime_type().unwrap_err().is_attachment_read_error());
    assert!(attachment.to_record().is_err());
}

#[test]
fn test_unrecognized_bytes_still_identified() {
    let dir = tempfile::tempdir().unwrap();
    let attachment = Attachment::new(write_file(dir.path(), "mystery", b"\x00\x01\x02\xfe\xff\x00"));

    let record = attachment.to_record().unwrap();
    assert_eq!(record.sniffed.mime_type, OCTET_STREAM);
    assert_eq!(record.sniffed.encoding, BINARY);
    assert_eq!(record.digests.md5.len(), 32);
    assert_eq!(record.digests.sha1.len(), 40);
    assert_eq!(record.digests.sha256.len(), 64);
    assert_eq!(record.digests.sha512.len(), 128);
}

#[test]
fn test_sniff_failure_keeps_digests() {
    struct BrokenSniffer;

    impl ContentSniffer for BrokenSniffer {
        fn sniff(&self, path: &Path) -> Result<Sniffed> {
            Err(Error::AttachmentRead {
                path: path.to_path_buf(),
                source: std::io::Error::other("device went away"),
            })
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let attachment = Attachment::new(write_file(dir.path(), "abc.bin", b"abc"));
    let identifier =
        AttachmentIdentifier::with_parts(StreamingDigest::default(), BrokenSniffer, NoScanner);

    assert_eq!(identifier.digests(&attachment).unwrap().sha256, ABC_SHA256);
    assert!(identifier.sniff(&attachment).is_err());
    assert!(identifier.identify(&attachment).is_err());
}

// --- Malware scanning ---

#[test]
fn test_malware_scan_is_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let attachment = Attachment::new(write_file(dir.path(), "abc.bin", b"abc"));

    let err = attachment.clamav().unwrap_err();
    assert!(err.is_unsupported());
    assert!(!err.is_attachment_read_error());

    let err = AttachmentIdentifier::new(&ExtractorConfig::default())
        .scan(&attachment)
        .unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn test_custom_scanner_backend() {
    struct Flagging;

    impl MalwareScanner for Flagging {
        fn scan(&self, _path: &Path) -> Result<Option<String>> {
            Ok(Some("Eicar-Test-Signature".into()))
        }
    }

    let identifier =
        AttachmentIdentifier::with_parts(StreamingDigest::default(), MagicSniffer::default(), Flagging);
    let verdict = identifier.scan(&Attachment::new("eicar.com")).unwrap();

    assert_eq!(verdict.as_deref(), Some("Eicar-Test-Signature"));
}
