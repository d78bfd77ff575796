use crate::lang::{lex, Operator, Position, Token, Word};

fn tokens(s: &str) -> Vec<Token> {
    lex(s).into_iter().map(|(t, _)| t).collect()
}

#[test]
fn test_declaration() {
    assert_eq!(
        tokens("shared Real x = 1.5;"),
        vec![
            Token::Word(Word::Shared),
            Token::Ident("Real".into()),
            Token::Ident("x".into()),
            Token::Assign,
            Token::Real(1.5),
            Token::Semicolon,
        ]
    );
}

#[test]
fn test_numbers() {
    assert_eq!(
        tokens("12 .5 1e3 2.5e-1 7."),
        vec![
            Token::Integer(12),
            Token::Real(0.5),
            Token::Real(1000.0),
            Token::Real(0.25),
            Token::Real(7.0),
        ]
    );
}

#[test]
fn test_operators() {
    use Operator::*;
    assert_eq!(
        tokens("a<=b&&!c||d!=e==f"),
        vec![
            Token::Ident("a".into()),
            Token::Operator(LessEqual),
            Token::Ident("b".into()),
            Token::Operator(AndAnd),
            Token::Operator(Bang),
            Token::Ident("c".into()),
            Token::Operator(OrOr),
            Token::Ident("d".into()),
            Token::Operator(NotEqual),
            Token::Ident("e".into()),
            Token::Operator(Equal),
            Token::Ident("f".into()),
        ]
    );
    assert_eq!(
        tokens("a & b | c = d"),
        vec![
            Token::Ident("a".into()),
            Token::Operator(And),
            Token::Ident("b".into()),
            Token::Operator(Or),
            Token::Ident("c".into()),
            Token::Assign,
            Token::Ident("d".into()),
        ]
    );
}

#[test]
fn test_guard_words() {
    assert_eq!(
        tokens("x = when a: 1 else 2;"),
        vec![
            Token::Ident("x".into()),
            Token::Assign,
            Token::Word(Word::When),
            Token::Ident("a".into()),
            Token::Colon,
            Token::Integer(1),
            Token::Word(Word::Else),
            Token::Integer(2),
            Token::Semicolon,
        ]
    );
}

#[test]
fn test_positions_skip_comments() {
    let t = lex("a\n  // note\n  bc");
    assert_eq!(t.len(), 2);
    assert_eq!(
        t[0].1,
        Position {
            row: 1,
            col: 1,
            offset: 0,
            len: 1
        }
    );
    assert_eq!(
        t[1].1,
        Position {
            row: 3,
            col: 3,
            offset: 14,
            len: 2
        }
    );
}

#[test]
fn test_text() {
    assert_eq!(
        tokens(r#""a\"b\n" "tab\t""#),
        vec![Token::Text("a\"b\n".into()), Token::Text("tab\t".into())]
    );
    assert_eq!(tokens("\"open"), vec![Token::Unknown("\"open".into())]);
}

#[test]
fn test_unknown_character() {
    assert_eq!(
        tokens("a @ b"),
        vec![
            Token::Ident("a".into()),
            Token::Unknown("@".into()),
            Token::Ident("b".into()),
        ]
    );
}

#[test]
fn test_integer_magnitude() {
    assert_eq!(
        tokens("-2147483648"),
        vec![
            Token::Operator(Operator::Minus),
            Token::Integer(2147483648),
        ]
    );
}
