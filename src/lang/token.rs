use std::rc::Rc;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Unknown(String),
    Ident(Rc<str>),
    /// Magnitude only; a leading minus is a separate token.
    Integer(i64),
    Real(f32),
    Text(Rc<str>),
    Word(Word),
    Operator(Operator),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Assign,
}

impl Token {
    pub fn from_punctuation(s: &str) -> Option<Token> {
        use Operator::*;
        let t = match s {
            "(" => Token::LParen,
            ")" => Token::RParen,
            "[" => Token::LBracket,
            "]" => Token::RBracket,
            "{" => Token::LBrace,
            "}" => Token::RBrace,
            "," => Token::Comma,
            ":" => Token::Colon,
            ";" => Token::Semicolon,
            "." => Token::Dot,
            "=" => Token::Assign,
            "+" => Token::Operator(Plus),
            "-" => Token::Operator(Minus),
            "*" => Token::Operator(Multiply),
            "/" => Token::Operator(Divide),
            "<" => Token::Operator(Less),
            ">" => Token::Operator(Greater),
            "<=" => Token::Operator(LessEqual),
            ">=" => Token::Operator(GreaterEqual),
            "==" => Token::Operator(Equal),
            "!=" => Token::Operator(NotEqual),
            "&&" => Token::Operator(AndAnd),
            "||" => Token::Operator(OrOr),
            "&" => Token::Operator(And),
            "|" => Token::Operator(Or),
            "!" => Token::Operator(Bang),
            _ => return None,
        };
        Some(t)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Token::*;
        match self {
            Unknown(s) => write!(f, "{}", s),
            Ident(s) => write!(f, "{}", s),
            Integer(n) => write!(f, "{}", n),
            Real(n) => write!(f, "{:?}", n),
            Text(s) => write!(f, "{:?}", s),
            Word(s) => write!(f, "{}", s),
            Operator(s) => write!(f, "{}", s),
            LParen => write!(f, "("),
            RParen => write!(f, ")"),
            LBracket => write!(f, "["),
            RBracket => write!(f, "]"),
            LBrace => write!(f, "{{"),
            RBrace => write!(f, "}}"),
            Comma => write!(f, ","),
            Colon => write!(f, ":"),
            Semicolon => write!(f, ";"),
            Dot => write!(f, "."),
            Assign => write!(f, "="),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Word {
    Const,
    Else,
    From,
    If,
    Import,
    Record,
    Shared,
    Type,
    When,
}

impl Word {
    pub const ALL: [Word; 9] = [
        Word::Const,
        Word::Else,
        Word::From,
        Word::If,
        Word::Import,
        Word::Record,
        Word::Shared,
        Word::Type,
        Word::When,
    ];

    pub fn from_str(s: &str) -> Option<Word> {
        Word::ALL.iter().copied().find(|w| w.as_str() == s)
    }

    pub fn as_str(self) -> &'static str {
        use Word::*;
        match self {
            Const => "const",
            Else => "else",
            From => "from",
            If => "if",
            Import => "import",
            Record => "record",
            Shared => "shared",
            Type => "type",
            When => "when",
        }
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Operator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    AndAnd,
    OrOr,
    And,
    Or,
    Bang,
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Operator::*;
        match self {
            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Multiply => write!(f, "*"),
            Divide => write!(f, "/"),
            Less => write!(f, "<"),
            Greater => write!(f, ">"),
            LessEqual => write!(f, "<="),
            GreaterEqual => write!(f, ">="),
            Equal => write!(f, "=="),
            NotEqual => write!(f, "!="),
            AndAnd => write!(f, "&&"),
            OrOr => write!(f, "||"),
            And => write!(f, "&"),
            Or => write!(f, "|"),
            Bang => write!(f, "!"),
        }
    }
}
