//! A block of positioned text, emitted as content-stream operators.

use lopdf::content::Operation;
use lopdf::Object;

use super::encoding::encode_winansi;

/// Accumulates lines of text inside one `BT ... ET` block.
///
/// Lines start at the origin passed to [`TextObject::new`] and move down by
/// the leading after each line. Nothing wraps or paginates; lines past the
/// bottom edge are still emitted.
#[derive(Debug, Clone)]
pub struct TextObject {
    operations: Vec<Operation>,
    line_count: usize,
    replaced_chars: usize,
}

impl TextObject {
    /// Begin a text object whose first baseline starts at `(x, y)`.
    pub fn new(x: f32, y: f32) -> Self {
        let operations = vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "Tm",
                vec![
                    Object::Integer(1),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(1),
                    Object::Real(x),
                    Object::Real(y),
                ],
            ),
        ];
        Self {
            operations,
            line_count: 0,
            replaced_chars: 0,
        }
    }

    /// Select a font resource and size, and set the leading to 1.2 x size.
    pub fn set_font(&mut self, resource_name: &str, size: f32) {
        self.operations.push(Operation::new(
            "Tf",
            vec![
                Object::Name(resource_name.as_bytes().to_vec()),
                Object::Real(size),
            ],
        ));
        self.set_leading(size * 1.2);
    }

    /// Set the baseline-to-baseline distance.
    pub fn set_leading(&mut self, leading: f32) {
        self.operations
            .push(Operation::new("TL", vec![Object::Real(leading)]));
    }

    /// Show one line of text and move to the start of the next line.
    pub fn text_line(&mut self, text: &str) {
        let encoded = encode_winansi(text);
        if encoded.replaced > 0 {
            log::warn!(
                "Line {}: {} character(s) not representable in WinAnsi, replaced with '?'",
                self.line_count + 1,
                encoded.replaced
            );
            self.replaced_chars += encoded.replaced;
        }
        self.operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encoded.bytes)],
        ));
        self.operations.push(Operation::new("T*", vec![]));
        self.line_count += 1;
    }

    /// Number of lines shown so far.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Characters that had to be replaced during encoding.
    pub fn replaced_chars(&self) -> usize {
        self.replaced_chars
    }

    /// Close the text object and return its operators.
    pub fn into_operations(mut self) -> Vec<Operation> {
        self.operations.push(Operation::new("ET", vec![]));
        self.operations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operators(ops: &[Operation]) -> Vec<&str> {
        ops.iter().map(|op| op.operator.as_str()).collect()
    }

    #[test]
    fn test_operator_sequence() {
        let mut text = TextObject::new(40.0, 752.0);
        text.set_font("F1", 12.0);
        text.text_line("Hello");
        text.text_line("World");
        assert_eq!(text.line_count(), 2);

        let ops = text.into_operations();
        assert_eq!(
            operators(&ops),
            vec!["BT", "Tm", "Tf", "TL", "Tj", "T*", "Tj", "T*", "ET"]
        );
    }

    #[test]
    fn test_leading_follows_font_size() {
        let mut text = TextObject::new(0.0, 0.0);
        text.set_font("F1", 10.0);
        let ops = text.into_operations();
        let tl = ops.iter().find(|op| op.operator == "TL").unwrap();
        match tl.operands[0] {
            Object::Real(v) => assert!((v - 12.0).abs() < 1e-4),
            ref other => panic!("unexpected operand {:?}", other),
        }
    }

    #[test]
    fn test_replaced_characters_are_counted() {
        let mut text = TextObject::new(0.0, 0.0);
        text.text_line("日本");
        text.text_line("ok");
        assert_eq!(text.replaced_chars(), 2);
    }
}
