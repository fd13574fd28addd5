//! Integration tests: text file -> PDF -> text.

use std::path::Path;

use lopdf::content::Content;
use lopdf::{dictionary, Object, Stream};
use txtpdf::{
    extract_text, extract_text_with_options, generate_pdf, generate_pdf_with_options, Error,
    PageSelection, PageSize, PdfReader, ReadOptions, StandardFont, WriteOptions,
};

/// Build a PDF with one page per content stream, all sharing Helvetica as /F1.
fn multi_page_pdf(contents: &[&str]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(612), Object::Integer(792)],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Build a one-page PDF whose page draws the given Form XObjects by name.
/// Forms carry no resources of their own unless `own_font` is set, in which
/// case each form declares Courier as /F1.
fn form_xobject_pdf(page: &str, forms: &[(&str, &str, Option<[i64; 6]>)], own_font: bool) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let helvetica_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let courier_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut xobjects = lopdf::Dictionary::new();
    for (name, content, matrix) in forms {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(612), Object::Integer(792)],
        };
        if let Some(m) = matrix {
            dict.set("Matrix", m.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>());
        }
        if own_font {
            dict.set(
                "Resources",
                dictionary! { "Font" => dictionary! { "F1" => Object::Reference(courier_id) } },
            );
        }
        let form_id = doc.add_object(Stream::new(dict, content.as_bytes().to_vec()));
        xobjects.set(*name, Object::Reference(form_id));
    }

    let content_id = doc.add_object(Stream::new(dictionary! {}, page.as_bytes().to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(612), Object::Integer(792)],
        "Contents" => Object::Reference(content_id),
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => Object::Reference(helvetica_id) },
            "XObject" => xobjects,
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Strings shown on page 1, in content-stream order.
fn shown_lines(pdf: &Path) -> Vec<String> {
    let doc = lopdf::Document::load(pdf).unwrap();
    let page_id = doc.get_pages()[&1];
    let data = doc.get_page_content(page_id).unwrap();
    Content::decode(&data)
        .unwrap()
        .operations
        .into_iter()
        .filter(|op| op.operator == "Tj")
        .map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => String::from_utf8_lossy(bytes).into_owned(),
            other => panic!("unexpected Tj operand {:?}", other),
        })
        .collect()
}

fn normalized_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect()
}

#[test]
fn test_hello_world_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("hello.txt");
    let output = dir.path().join("hello.pdf");
    std::fs::write(&input, "Hello\nWorld\n").unwrap();

    generate_pdf(&input, &output).unwrap();
    let text = extract_text(&output).unwrap();

    assert_eq!(normalized_lines(&text), vec!["Hello", "World"]);
}

#[test]
fn test_one_text_line_per_input_line() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    let output = dir.path().join("output.pdf");
    std::fs::write(
        &input,
        "first line   \n  second keeps its indent\t\n\nfourth (with parens) \\ and backslash\r\nlast without newline",
    )
    .unwrap();

    assert_eq!(generate_pdf(&input, &output).unwrap(), 5);
    assert_eq!(
        shown_lines(&output),
        vec![
            "first line",
            "  second keeps its indent",
            "",
            "fourth (with parens) \\ and backslash",
            "last without newline",
        ]
    );
}

#[test]
fn test_round_trip_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("list.txt");
    let output = dir.path().join("list.pdf");
    let lines: Vec<String> = (1..=30).map(|i| format!("item number {}", i)).collect();
    std::fs::write(&input, lines.join("\n")).unwrap();

    generate_pdf(&input, &output).unwrap();
    let text = extract_text(&output).unwrap();

    assert_eq!(normalized_lines(&text), lines);
}

#[test]
fn test_overflowing_lines_are_still_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("long.txt");
    let output = dir.path().join("long.pdf");
    let lines: Vec<String> = (1..=200).map(|i| format!("row {}", i)).collect();
    std::fs::write(&input, lines.join("\n")).unwrap();

    generate_pdf(&input, &output).unwrap();

    let reader = PdfReader::open(&output).unwrap();
    assert_eq!(reader.page_count(), 1);
    let text = reader.extract().unwrap().to_text();
    assert_eq!(normalized_lines(&text), lines);
}

#[test]
fn test_latin1_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("accents.txt");
    let output = dir.path().join("accents.pdf");
    std::fs::write(&input, "Café crème\n5 €\n").unwrap();

    generate_pdf(&input, &output).unwrap();
    let text = extract_text(&output).unwrap();

    assert_eq!(normalized_lines(&text), vec!["Café crème", "5 €"]);
}

#[test]
fn test_custom_options() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    let output = dir.path().join("out.pdf");
    std::fs::write(&input, "alpha\nbeta\n").unwrap();

    let options = WriteOptions::new()
        .with_page_size(PageSize::A4)
        .with_font(StandardFont::Courier)
        .with_font_size(9.0)
        .with_title("Greek letters");
    generate_pdf_with_options(&input, &output, options).unwrap();

    let doc = lopdf::Document::load(&output).unwrap();
    let page_id = doc.get_pages()[&1];
    let page = doc.get_dictionary(page_id).unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    assert!((media_box[3].as_float().unwrap() - 841.8898).abs() < 0.01);

    assert_eq!(normalized_lines(&extract_text(&output).unwrap()), vec!["alpha", "beta"]);
}

#[test]
fn test_missing_input_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.pdf");

    let result = generate_pdf(dir.path().join("nope.txt"), &output);

    assert!(matches!(result, Err(Error::Io(_))));
    assert!(!output.exists());
}

#[test]
fn test_reader_visits_pages_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("three.pdf");
    std::fs::write(
        &pdf,
        multi_page_pdf(&[
            "BT /F1 12 Tf 72 720 Td (Page one) Tj ET",
            "BT /F1 12 Tf 72 720 Td (Page two) Tj 0 -14 Td (second line) Tj ET",
            "BT /F1 12 Tf 72 720 Td [(Page) -250 (three)] TJ ET",
        ]),
    )
    .unwrap();

    let text = extract_text(&pdf).unwrap();
    assert_eq!(text, "Page one\nPage two\nsecond line\nPage three\n");
}

#[test]
fn test_reader_page_selection() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("three.pdf");
    std::fs::write(
        &pdf,
        multi_page_pdf(&[
            "BT /F1 12 Tf 72 720 Td (one) Tj ET",
            "BT /F1 12 Tf 72 720 Td (two) Tj ET",
            "BT /F1 12 Tf 72 720 Td (three) Tj ET",
        ]),
    )
    .unwrap();

    let options = ReadOptions::new().with_pages(PageSelection::parse("1,3").unwrap());
    let reader = PdfReader::open_with_options(&pdf, options).unwrap();
    let extracted = reader.extract().unwrap();

    let numbers: Vec<u32> = extracted.pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![1, 3]);
    assert_eq!(extracted.to_text(), "one\nthree\n");
}

#[test]
fn test_reader_fails_on_page_without_text() {
    // A page that only paints graphics, like a scanned image page.
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("mixed.pdf");
    std::fs::write(
        &pdf,
        multi_page_pdf(&[
            "BT /F1 12 Tf 72 720 Td (text page) Tj ET",
            "q 0 0 1 rg 72 72 200 200 re f Q",
        ]),
    )
    .unwrap();

    assert!(matches!(extract_text(&pdf), Err(Error::NoText(2))));

    let text = extract_text_with_options(&pdf, ReadOptions::new().lenient()).unwrap();
    assert_eq!(text, "text page\n\n");
}

#[test]
fn test_reader_respects_text_positions() {
    // Drawn bottom line first; reading order follows the page, not the stream.
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("reversed.pdf");
    std::fs::write(
        &pdf,
        multi_page_pdf(&[
            "BT /F1 12 Tf 72 600 Td (bottom) Tj ET BT /F1 12 Tf 1 0 0 1 72 700 Tm (top) Tj ET",
        ]),
    )
    .unwrap();

    assert_eq!(extract_text(&pdf).unwrap(), "top\nbottom\n");
}

#[test]
fn test_reader_rejects_non_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake.pdf");
    std::fs::write(&path, "Hello\nWorld\n").unwrap();

    assert!(matches!(extract_text(&path), Err(Error::UnknownFormat)));
    assert!(matches!(
        extract_text(dir.path().join("missing.pdf")),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_reader_extracts_form_xobject_text() {
    let pdf = form_xobject_pdf(
        "q /Fm1 Do Q",
        &[("Fm1", "BT /F1 12 Tf 72 720 Td (Inside form) Tj ET", None)],
        false,
    );

    let reader = PdfReader::from_bytes(&pdf).unwrap();
    assert_eq!(reader.extract().unwrap().to_text(), "Inside form\n");
}

#[test]
fn test_form_xobject_matrix_and_nesting() {
    // Fm1 is shifted up by its /Matrix, so its line reads before the page's.
    // Fm2 runs inside Fm1 and inherits the shift.
    let pdf = form_xobject_pdf(
        "BT /F1 12 Tf 72 600 Td (page text) Tj ET q /Fm1 Do Q",
        &[
            ("Fm1", "BT /F1 12 Tf 72 600 Td (shifted form) Tj ET /Fm2 Do", Some([1, 0, 0, 1, 0, 100])),
            ("Fm2", "BT /F1 12 Tf 72 400 Td (nested form) Tj ET", None),
        ],
        true,
    );

    let reader = PdfReader::from_bytes(&pdf).unwrap();
    assert_eq!(
        reader.extract().unwrap().to_text(),
        "shifted form\npage text\nnested form\n"
    );
}

#[test]
fn test_self_referencing_form_terminates() {
    let pdf = form_xobject_pdf(
        "/Fm1 Do",
        &[("Fm1", "BT /F1 12 Tf 72 720 Td (loop) Tj ET /Fm1 Do", None)],
        false,
    );

    let reader = PdfReader::from_bytes(&pdf).unwrap();
    let text = reader.extract().unwrap().to_text();
    assert!(text.starts_with("loop"));
}

#[test]
fn test_font_set_inside_saved_state_does_not_leak() {
    // The 40pt font ends with Q; the following lines are grouped at 12pt.
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("q.pdf");
    std::fs::write(
        &pdf,
        multi_page_pdf(&[
            "BT /F1 12 Tf ET q BT /F1 40 Tf 72 740 Td (big) Tj ET Q \
             BT 72 700 Td (first) Tj 0 -8 Td (second) Tj ET",
        ]),
    )
    .unwrap();

    assert_eq!(extract_text(&pdf).unwrap(), "big\nfirst\nsecond\n");
}
