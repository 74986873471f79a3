#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn markup_characters_are_escaped() {
    assert_eq!(stringify_str("</script>"), r#""\u003C\u002Fscript\u003E""#);
    assert_eq!(stringify_str("a\u{2028}b"), r#""a\u2028b""#);
    assert_eq!(stringify_str("say \"hi\"\n"), r#""say \"hi\"\n""#);
}

#[test]
fn inner_text_drops_the_quotes() {
    assert_eq!(stringify_inner("<p>"), r"\u003Cp\u003E");
    assert_eq!(stringify_inner(""), "");
}

#[test]
fn values() {
    assert_eq!(stringify(&Value::Undefined), "undefined");
    assert_eq!(stringify(&Value::Bool(true)), "true");
    assert_eq!(
        stringify(&Value::Array(vec![Value::Bool(false), Value::string("/")])),
        r#"[false,"\u002F"]"#
    );
}
