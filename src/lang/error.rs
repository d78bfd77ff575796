use super::Position;
use std::rc::Rc;

#[derive(Clone, PartialEq)]
pub struct Error {
    code: u16,
    item: Option<Rc<str>>,
    position: Option<Position>,
    message: String,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, ..$pos:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_position($pos)
    };
    ($err:ident, $item:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).with_item($item)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, ..$pos:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_position($pos)
            .message($msg)
    };
    ($err:ident, $item:expr, ..$pos:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .with_item($item)
            .in_position($pos)
            .message($msg)
    };
    ($err:ident, $item:expr, ..$pos:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .with_item($item)
            .in_position($pos)
    };
    ($err:ident, $item:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .with_item($item)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code: code as u16,
            item: None,
            position: None,
            message: String::new(),
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code as u16
    }

    /// Run time failures use codes from 100 up; everything below is static.
    pub fn is_runtime(&self) -> bool {
        self.code >= 100
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn row(&self) -> usize {
        self.position.map_or(0, |p| p.row)
    }

    pub fn col(&self) -> usize {
        self.position.map_or(0, |p| p.col)
    }

    pub fn offset(&self) -> usize {
        self.position.map_or(0, |p| p.offset)
    }

    pub fn item(&self) -> Option<&str> {
        self.item.as_deref()
    }

    pub fn with_item(self, item: &str) -> Error {
        debug_assert!(self.item.is_none());
        Error {
            item: Some(item.into()),
            ..self
        }
    }

    pub fn in_position(self, position: &Position) -> Error {
        debug_assert!(self.position.is_none());
        Error {
            position: Some(*position),
            ..self
        }
    }

    /// Attaches the position of the statement that failed, replacing any
    /// position the error already had.
    pub fn at(self, position: &Position) -> Error {
        Error {
            position: Some(*position),
            ..self
        }
    }

    pub fn message(self, message: &str) -> Error {
        debug_assert_eq!(self.message.len(), 0);
        Error {
            message: message.to_string(),
            ..self
        }
    }

    /// Folds the position into the detail so an error raised by a
    /// dispatched script can be re-attached to the caller's statement.
    pub fn in_script(self, script: &str) -> Error {
        let mut detail = match self.position {
            Some(p) => format!("in script {} at {}", script, p),
            None => format!("in script {}", script),
        };
        if !self.message.is_empty() {
            detail = format!("{}; {}", self.message, detail);
        }
        Error {
            position: None,
            message: detail,
            ..self
        }
    }

    fn explain(&self) -> &'static str {
        match self.code {
            1 => "expected %1",
            2 => "%1 has been already declared.",
            3 => "%1 has not been declared.",
            4 => "%1 is not a variable.",
            5 => "incompatible types in assignment to %1.",
            6 => "incompatible types in %1 expression.",
            7 => "expected integer in %1 expression.",
            8 => "expected integer or real in %1 expression.",
            9 => "expected base type in %1 expression.",
            10 => "%1 is not a function.",
            11 => "wrong number of arguments in %1.",
            12 => "incompatible arguments in %1.",
            13 => "%1 is not a type.",
            14 => "wrong number of components in %1 expression.",
            15 => "duplicate declaration of %1.",
            16 => "%1 is not a member.",
            17 => "symbol %1 is not a shared variable",
            18 => "cannot assign to imported variable %1",
            19 => "variable %1 has not been exported",
            20 => "script \"%1\" not found",
            21 => "script %1 depends on this script",
            22 => "%1 is not a constant expression.",
            23 => "%1 is not a vector or matrix.",
            24 => "unexpected %1",
            25 => "expression nested too deeply.",
            26 => "integer %1 is out of range.",
            100 => "division by zero error",
            101 => "out of range error",
            102 => "no value error",
            103 => "out of bounds error",
            104 => "path too long error",
            105 => "script %1 not found",
            106 => "cyclic dispatch of script %1",
            107 => "compilation failed",
            108 => "host function %1 failed",
            109 => "stack overflow",
            199 => "internal error",
            _ => "",
        }
    }

    /// The human readable message without position.
    pub fn text(&self) -> String {
        let explain = self.explain();
        let mut s = if explain.is_empty() {
            format!("program error {}", self.code)
        } else {
            explain.replace("%1", self.item.as_deref().unwrap_or("?"))
        };
        if !self.message.is_empty() {
            s.push_str("; ");
            s.push_str(&self.message);
        }
        s
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorCode {
    Expected = 1,
    AlreadyDeclared = 2,
    NotDeclared = 3,
    NotVariable = 4,
    AssignmentMismatch = 5,
    ExpressionMismatch = 6,
    ExpectedInteger = 7,
    ExpectedNumeric = 8,
    ExpectedBase = 9,
    NotFunction = 10,
    WrongArgumentCount = 11,
    IncompatibleArguments = 12,
    NotType = 13,
    WrongComponents = 14,
    DuplicateDeclaration = 15,
    NoMember = 16,
    NotShared = 17,
    AssignToImport = 18,
    NotExported = 19,
    ScriptNotFound = 20,
    CyclicImport = 21,
    NotConstant = 22,
    NotIndexable = 23,
    Unexpected = 24,
    TooDeep = 25,
    IntegerRange = 26,

    DivisionByZero = 100,
    OutOfRange = 101,
    NoValue = 102,
    OutOfBounds = 103,
    PathTooLong = 104,
    DispatchNotFound = 105,
    CyclicDispatch = 106,
    CompilationFailed = 107,
    HostFailure = 108,
    StackOverflow = 109,
    InternalError = 199,
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.position {
            Some(p) => write!(f, "{} at {}", self.text(), p),
            None => write!(f, "{}", self.text()),
        }
    }
}

impl std::error::Error for Error {}
