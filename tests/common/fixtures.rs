//! Archive fixtures built in memory.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;

/// The layout every fixture archive uses: a single top-level directory, the
/// way most release tarballs are packed.
pub const GRADLE_LAYOUT: &[(&str, &str)] = &[
    ("gradle-8.5/bin/gradle", "#!/bin/sh\necho gradle\n"),
    ("gradle-8.5/lib/gradle-launcher.jar", "launcher"),
    ("gradle-8.5/LICENSE", "Apache-2.0"),
];

pub fn tar_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap()
}

pub fn tar_gz_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tar_bytes(files)).unwrap();
    encoder.finish().unwrap()
}

pub fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in files {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}
