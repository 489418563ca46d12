use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use qcpdf::{CellValue, Table};
use std::path::{Path, PathBuf};

/// A numeric table whose cell `(r, c)` holds `r * 10 + c`, with columns `c0, c1, ...`.
pub fn numeric_table(rows: usize, columns: usize) -> Table {
    let names = (0..columns).map(|c| format!("c{}", c)).collect();
    let cells = (0..rows)
        .map(|r| (0..columns).map(|c| CellValue::Number((r * 10 + c) as f64)).collect())
        .collect();
    Table::new(names, cells).expect("rectangular table")
}

/// Writes `contents` to `<dir>/<name>` and returns the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

/// A QC table with one failing sample and one score above the default threshold.
pub fn qc_csv() -> &'static str {
    "sample,js_score,qc_pass\n\
     S1,0.02,True\n\
     S2,0.35,True\n\
     S3,0.04,False\n\
     S4,0.01,True\n"
}

/// Writes a PDF of `pages` pages, each drawing `"<label> <n>"`.
pub fn write_labelled_pdf(dir: &Path, name: &str, label: &str, pages: u32) -> PathBuf {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for n in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("{} {}", label, n).into_bytes(),
                        StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id =
            doc.add_object(Stream::new(dictionary! {}, content.encode().expect("encode content")));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).expect("save fixture pdf");
    path
}
