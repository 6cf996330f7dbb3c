use kleinanzeigen_links::{export, ExportFormat};
use std::io::Read;

fn sample_links() -> Vec<String> {
    (1..=3)
        .map(|i| format!("https://www.kleinanzeigen.de/s-anzeige/felge/280182167{}-223-8242", i))
        .collect()
}

#[test]
fn test_every_format_writes_a_readable_file() {
    let dir = tempfile::tempdir().expect("temp dir");

    for format in ExportFormat::ALL {
        let path = dir.path().join(format.default_file_name());
        let bytes = export(&sample_links(), format).expect("encode");
        std::fs::write(&path, &bytes).expect("write export");

        let written = std::fs::read(&path).expect("read back");
        assert_eq!(written, bytes, "{format} changed on disk");
        assert_eq!(
            path.extension().and_then(|e| e.to_str()),
            Some(format.extension())
        );
    }

    let text = std::fs::read_to_string(dir.path().join("kleinanzeigen_links.txt")).expect("txt");
    assert_eq!(text.lines().count(), 3);

    let csv = std::fs::read_to_string(dir.path().join("kleinanzeigen_links.csv")).expect("csv");
    assert_eq!(csv.lines().next(), Some("Listing URL"));
    assert_eq!(csv.lines().count(), 4);
}

#[test]
fn test_office_files_open_as_zip_archives() {
    for (format, part) in [
        (ExportFormat::Xlsx, "xl/worksheets/sheet1.xml"),
        (ExportFormat::Docx, "word/document.xml"),
    ] {
        let bytes = export(&sample_links(), format).expect("encode");
        let mut archive =
            zip::ZipArchive::new(std::io::Cursor::new(bytes)).expect("valid zip archive");
        let mut xml = String::new();
        archive
            .by_name(part)
            .expect("main part present")
            .read_to_string(&mut xml)
            .expect("read part");

        for link in sample_links() {
            assert!(xml.contains(&link), "{format} is missing {link}");
        }
    }
}
