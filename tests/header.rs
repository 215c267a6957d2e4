//! Header recognition and parse failures

use plykit::{recognize, Encoding, PlyError, PropertySpec, ScalarType, Schema};
use std::io::Cursor;

fn parse(text: &str) -> Result<Schema, PlyError> {
    Schema::parse(Cursor::new(text))
}

#[test]
fn test_greg_turk_cube_header() {
    let header = "ply
format binary_big_endian 1.0
comment made by Greg Turk
comment this file is a cube
element vertex 8
property float x
property float y
property float z
element face 6
property list uchar int vertex_index
end_header
";
    let mut data = header.as_bytes().to_vec();
    data.extend_from_slice(&[0u8; 16]);

    let schema = Schema::parse(Cursor::new(data)).unwrap();
    assert_eq!(schema.encoding, Encoding::BinaryBigEndian);
    assert_eq!(
        schema.comments,
        vec!["made by Greg Turk", "this file is a cube"]
    );
    assert_eq!(schema.data_offset, header.len() as u64);

    let names: Vec<_> = schema.elements.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["vertex", "face"]);
    assert_eq!(
        schema.elements[1].properties,
        vec![PropertySpec::List {
            name: "vertex_index".into(),
            count_type: ScalarType::UChar,
            data_type: ScalarType::Int,
        }]
    );
}

#[test]
fn test_bad_magic_is_format_mismatch() {
    let err = parse("xyz\nformat ascii 1.0\nend_header\n").unwrap_err();
    assert!(err.is_format_mismatch());

    assert!(parse("").unwrap_err().is_format_mismatch());
    assert!(recognize(Cursor::new("xyz\n")).unwrap().is_none());
}

#[test]
fn test_bad_format_line_is_format_mismatch() {
    for text in [
        "ply\nformat binary_middle_endian 1.0\nend_header\n",
        "ply\nformat ascii\nend_header\n",
        "ply\nversion ascii 1.0\nend_header\n",
        "ply\n",
    ] {
        let err = parse(text).unwrap_err();
        assert!(err.is_format_mismatch(), "{text:?} gave {err}");
    }
}

#[test]
fn test_missing_end_header_is_truncated() {
    let err = parse("ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n").unwrap_err();
    assert!(matches!(err, PlyError::HeaderTruncated));

    // Recognized, so this is fatal rather than "not ours".
    assert!(recognize(Cursor::new("ply\nformat ascii 1.0\n")).is_err());
}

#[test]
fn test_bad_property_line() {
    let err = parse(
        "ply\nformat ascii 1.0\nelement vertex 1\nproperty foo bar baz qux\nend_header\n",
    )
    .unwrap_err();
    assert!(matches!(err, PlyError::HeaderParse { line: 4, .. }));

    let err = parse("ply\nformat ascii 1.0\nelement vertex 1\nproperty float\nend_header\n")
        .unwrap_err();
    assert!(matches!(err, PlyError::HeaderParse { .. }));
}

#[test]
fn test_property_before_element() {
    let err = parse("ply\nformat ascii 1.0\nproperty float x\nend_header\n").unwrap_err();
    assert!(matches!(err, PlyError::HeaderParse { line: 3, .. }));
}

#[test]
fn test_unknown_keyword_and_empty_line() {
    let err = parse("ply\nformat ascii 1.0\nobj_info hello\nend_header\n").unwrap_err();
    assert!(matches!(err, PlyError::HeaderParse { .. }));

    let err = parse("ply\nformat ascii 1.0\n\nend_header\n").unwrap_err();
    assert!(matches!(err, PlyError::HeaderParse { .. }));
}

#[test]
fn test_bad_element_lines() {
    for text in [
        "ply\nformat ascii 1.0\nelement vertex -1\nproperty float x\nend_header\n",
        "ply\nformat ascii 1.0\nelement vertex\nend_header\n",
        "ply\nformat ascii 1.0\nelement vertex 1 2\nend_header\n",
        "ply\nformat ascii 1.0\nelement vertex 1\nend_header\n",
        "ply\nformat ascii 1.0\nelement vertex 1\nproperty half x\nend_header\n",
    ] {
        let err = parse(text).unwrap_err();
        assert!(matches!(err, PlyError::HeaderParse { .. }), "{text:?} gave {err}");
    }
}

#[test]
fn test_sized_type_aliases() {
    let schema = parse(
        "ply\nformat ascii 1.0\nelement v 1\nproperty uint8 a\nproperty float64 b\nend_header\n",
    )
    .unwrap();
    assert_eq!(
        schema.elements[0].properties,
        vec![
            PropertySpec::Scalar {
                name: "a".into(),
                data_type: ScalarType::UChar
            },
            PropertySpec::Scalar {
                name: "b".into(),
                data_type: ScalarType::Double
            },
        ]
    );
}
