use super::statement::{Kind, Target};
use super::{
    Dispatcher, Globals, Link, Opcode, Program, SharedId, SharedTable, Slot, Statement, Symbol,
    Val, Variable,
};
use crate::error;
use crate::lang::{Error, Lexer, Operation, Operator, Position, RecordType, Token, Type, Word};
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::rc::Rc;
use tracing::debug;

type Result<T> = std::result::Result<T, Error>;

/// Integer expression statements leave their value here.
pub const RESULT: &str = "gl_result";
const RESULT_SLOT: usize = 0;
/// Nested expressions, blocks and record types beyond this are refused.
const MAX_NESTING: usize = 64;

/// What the compiler needs to know about the other units of a scope.
pub trait Units {
    fn contains(&self, unit: &str) -> bool;
    fn names(&self) -> Vec<Rc<str>>;
    fn exports(&self, unit: &str) -> Option<&BTreeMap<Rc<str>, SharedId>>;
    /// Whether `top` imports or dispatches `sub`, directly or through others.
    fn subscript_relation(&self, top: &str, sub: &str) -> bool;
}

/// ## Single pass compiler
///
/// Tokens are pulled from the lexer one at a time and code is emitted as
/// soon as each construct has been checked. There is no syntax tree.
/// Shared declarations are made in the shared table right away; the
/// caller decides what to keep by acquiring or sweeping afterwards.
pub struct Compiler<'a> {
    unit: Rc<str>,
    globals: &'a Globals,
    units: &'a dyn Units,
    shared: &'a mut SharedTable,
    lexer: Lexer<'a>,
    peeked: Option<(Token, Position)>,
    nesting: usize,
    program: Program,
}

fn binary_operation(token: Option<&Token>) -> Option<(usize, Operation)> {
    let op = match token {
        Some(Token::Operator(op)) => op,
        _ => return None,
    };
    Some(match op {
        Operator::OrOr => (1, Operation::Or),
        Operator::AndAnd => (2, Operation::And),
        Operator::Or => (3, Operation::BitOr),
        Operator::And => (4, Operation::BitAnd),
        Operator::Equal => (5, Operation::Equal),
        Operator::NotEqual => (5, Operation::NotEqual),
        Operator::Less => (6, Operation::Less),
        Operator::Greater => (6, Operation::Greater),
        Operator::LessEqual => (6, Operation::LessEq),
        Operator::GreaterEqual => (6, Operation::GreaterEq),
        Operator::Plus => (7, Operation::Add),
        Operator::Minus => (7, Operation::Sub),
        Operator::Multiply => (8, Operation::Mul),
        Operator::Divide => (8, Operation::Div),
        Operator::Bang => return None,
    })
}

fn int_literal(n: i64, pos: &Position) -> Result<i32> {
    match i32::try_from(n) {
        Ok(n) => Ok(n),
        Err(_) => Err(error!(IntegerRange, &n.to_string(), ..pos)),
    }
}

impl<'a> Compiler<'a> {
    pub fn new(
        unit: &str,
        globals: &'a Globals,
        units: &'a dyn Units,
        shared: &'a mut SharedTable,
    ) -> Compiler<'a> {
        Compiler {
            unit: unit.into(),
            globals,
            units,
            shared,
            lexer: Lexer::new(""),
            peeked: None,
            nesting: 0,
            program: Program::default(),
        }
    }

    pub fn compile(mut self, source: &'a str) -> Result<Program> {
        self.begin(source);
        while self.peek().is_some() {
            self.statement()?;
        }
        debug!(
            unit = %self.unit,
            statements = self.program.statements.len(),
            slots = self.program.slots.len(),
            "compiled"
        );
        Ok(self.program)
    }

    /// Names declared by `source` up to the first error.
    pub fn declarations(mut self, source: &'a str) -> Vec<Rc<str>> {
        self.begin(source);
        while self.peek().is_some() {
            if self.statement().is_err() {
                break;
            }
        }
        self.program.symbols.keys().cloned().collect()
    }

    fn begin(&mut self, source: &'a str) {
        self.lexer = Lexer::new(source);
        self.peeked = None;
        self.nesting = 0;
        self.program = Program::default();
        self.program.functions = self.globals.functions().to_vec();
        let slot = self.add_slot(Slot::Local(Type::Integer));
        debug_assert_eq!(slot, RESULT_SLOT);
        self.program.symbols.insert(
            RESULT.into(),
            Symbol::Variable(Variable {
                ty: Type::Integer,
                slot,
                shared: None,
                imported: false,
            }),
        );
    }

    fn peek(&mut self) -> Option<&Token> {
        if self.peeked.is_none() {
            self.peeked = self.lexer.next();
        }
        self.peeked.as_ref().map(|(t, _)| t)
    }

    fn peek_position(&mut self) -> Position {
        self.peek();
        match &self.peeked {
            Some((_, pos)) => *pos,
            None => self.lexer.here(),
        }
    }

    /// Whether the statement at the cursor is an assignment: a name, any
    /// `[index]` and `.field` steps, then `=`.
    fn assignment_ahead(&mut self) -> bool {
        self.peek();
        let mut lexer = self.lexer.clone();
        let mut depth = 0usize;
        while let Some((token, _)) = lexer.next() {
            match token {
                Token::LBracket => depth += 1,
                Token::RBracket if depth > 0 => depth -= 1,
                _ if depth > 0 => {}
                Token::Assign => return true,
                Token::Dot => match lexer.next() {
                    Some((Token::Ident(_), _)) => {}
                    _ => return false,
                },
                _ => return false,
            }
        }
        false
    }

    fn next(&mut self) -> Option<(Token, Position)> {
        match self.peeked.take() {
            Some(peeked) => Some(peeked),
            None => self.lexer.next(),
        }
    }

    fn accept(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.next();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> Result<Position> {
        let pos = self.peek_position();
        if self.accept(&token) {
            Ok(pos)
        } else {
            Err(self.unexpected(&token.to_string()))
        }
    }

    fn unexpected(&mut self, wanted: &str) -> Error {
        let pos = self.peek_position();
        match self.peek() {
            Some(token) => {
                let token = token.to_string();
                error!(Unexpected, &token, ..&pos; &format!("expected {}", wanted))
            }
            None => error!(Expected, wanted, ..&pos),
        }
    }

    fn ident(&mut self) -> Result<(Rc<str>, Position)> {
        match self.peek() {
            Some(Token::Ident(_)) => {}
            _ => return Err(self.unexpected("identifier")),
        }
        match self.next() {
            Some((Token::Ident(name), pos)) => Ok((name, pos)),
            _ => Err(error!(InternalError)),
        }
    }

    fn lookup(&self, name: &str) -> Option<Symbol> {
        match self.program.symbols.get(name) {
            Some(symbol) => Some(symbol.clone()),
            None => self.globals.get(name).cloned(),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            let pos = self.peek_position();
            return Err(error!(TooDeep, ..&pos));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
    }

    fn declare_check(&self, name: &str, pos: &Position) -> Result<()> {
        if self.program.symbols.contains_key(name) || self.globals.contains(name) {
            Err(error!(AlreadyDeclared, name, ..pos))
        } else {
            Ok(())
        }
    }

    fn add_slot(&mut self, slot: Slot) -> usize {
        self.program.slots.push(slot);
        self.program.slots.len() - 1
    }

    fn emit(&mut self, kind: Kind, link: Link, pos: Position) -> Result<usize> {
        self.program.statements.push(Statement::new(kind, link, pos)?);
        Ok(self.program.statements.len() - 1)
    }

    /// Points a jump opened at statement `at` to the next statement emitted.
    fn resolve(&mut self, at: usize) {
        let distance = self.program.statements.len() - at;
        self.program.statements[at].set_jump(distance);
    }

    fn statement(&mut self) -> Result<()> {
        let token = match self.peek() {
            Some(token) => token.clone(),
            None => return Err(self.unexpected("statement")),
        };
        match token {
            Token::Semicolon => {
                self.next();
                Ok(())
            }
            Token::LBrace => self.block(),
            Token::Word(Word::Shared) => {
                self.next();
                self.declaration(true)
            }
            Token::Word(Word::Record) => self.declaration(false),
            Token::Word(Word::Type) => self.typedef(),
            Token::Word(Word::Const) => self.constant(),
            Token::Word(Word::Import) => self.import(),
            Token::Word(Word::If) => self.if_statement(),
            Token::Ident(name) => match self.lookup(&name) {
                Some(Symbol::Typedef(_)) => self.declaration(false),
                Some(Symbol::Variable(_)) | None if self.assignment_ahead() => self.assignment(),
                _ => self.expression_statement(),
            },
            _ => self.expression_statement(),
        }
    }

    fn block(&mut self) -> Result<()> {
        self.expect(Token::LBrace)?;
        self.enter()?;
        loop {
            match self.peek() {
                Some(Token::RBrace) => break,
                None => return Err(self.unexpected("}")),
                _ => self.statement()?,
            }
        }
        self.expect(Token::RBrace)?;
        self.leave();
        Ok(())
    }

    fn type_spec(&mut self) -> Result<Type> {
        let mut ty = if self.accept(&Token::Word(Word::Record)) {
            self.expect(Token::LParen)?;
            self.enter()?;
            let mut fields: Vec<(Rc<str>, Type)> = vec![];
            loop {
                let ty = self.type_spec()?;
                let (name, pos) = self.ident()?;
                if fields.iter().any(|(n, _)| *n == name) {
                    return Err(error!(DuplicateDeclaration, &name, ..&pos));
                }
                fields.push((name, ty));
                if !self.accept(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen)?;
            self.leave();
            Type::Record(Rc::new(RecordType::new(fields)))
        } else {
            let (name, pos) = self.ident()?;
            match self.lookup(&name) {
                Some(Symbol::Typedef(ty)) => ty,
                Some(_) => return Err(error!(NotType, &name, ..&pos)),
                None => return Err(error!(NotDeclared, &name, ..&pos)),
            }
        };
        while self.peek() == Some(&Token::LBracket) {
            self.next();
            self.expect(Token::RBracket)?;
            ty = Type::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn declaration(&mut self, shared: bool) -> Result<()> {
        let ty = self.type_spec()?;
        loop {
            let (name, pos) = self.ident()?;
            self.declare_check(&name, &pos)?;
            let id = if shared {
                let id = self.shared.declare(&self.unit, &name, &ty);
                self.program.exports.insert(name.clone(), id);
                self.program.references.push(id);
                Some(id)
            } else {
                None
            };
            let slot = self.add_slot(match id {
                Some(id) => Slot::Shared(id),
                None => Slot::Local(ty.clone()),
            });
            self.program.symbols.insert(
                name.clone(),
                Symbol::Variable(Variable {
                    ty: ty.clone(),
                    slot,
                    shared: id,
                    imported: false,
                    }),
            );
            if self.accept(&Token::Assign) {
                let mut link = Link::new();
                self.value(&mut link, &ty, &name)?;
                self.emit(Kind::Assignment(Target::Slot { slot, path: 0 }), link, pos)?;
            }
            if !self.accept(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::Semicolon)?;
        Ok(())
    }

    fn typedef(&mut self) -> Result<()> {
        self.next();
        let (name, pos) = self.ident()?;
        self.declare_check(&name, &pos)?;
        self.expect(Token::Assign)?;
        let ty = self.type_spec()?;
        self.expect(Token::Semicolon)?;
        self.program.symbols.insert(name, Symbol::Typedef(ty));
        Ok(())
    }

    fn constant(&mut self) -> Result<()> {
        self.next();
        let ty = self.type_spec()?;
        let (name, pos) = self.ident()?;
        self.declare_check(&name, &pos)?;
        self.expect(Token::Assign)?;
        let vpos = self.peek_position();
        let val = self.constant_value()?;
        if !ty.is_base() || !ty.assignable(&val.ty()) {
            return Err(error!(AssignmentMismatch, &name, ..&vpos));
        }
        let val = match (&ty, val) {
            (Type::Real, Val::Integer(n)) => Val::Real(n as f32),
            (_, val) => val,
        };
        self.expect(Token::Semicolon)?;
        self.program.symbols.insert(name, Symbol::Constant(val));
        Ok(())
    }

    fn constant_value(&mut self) -> Result<Val> {
        let pos = self.peek_position();
        let negate = self.accept(&Token::Operator(Operator::Minus));
        let val = match self.next() {
            Some((Token::Integer(n), p)) if negate => {
                return Ok(Val::Integer(int_literal(-n, &p)?));
            }
            Some((Token::Integer(n), p)) => Val::Integer(int_literal(n, &p)?),
            Some((Token::Real(n), _)) => Val::Real(n),
            Some((Token::Text(s), _)) => Val::Text(s),
            Some((Token::Ident(name), p)) => match self.lookup(&name) {
                Some(Symbol::Constant(val)) => val,
                _ => return Err(error!(NotConstant, &name, ..&p)),
            },
            Some((token, p)) => return Err(error!(NotConstant, &token.to_string(), ..&p)),
            None => return Err(error!(Expected, "constant", ..&pos)),
        };
        if !negate {
            return Ok(val);
        }
        match val {
            Val::Integer(n) => Ok(Val::Integer(n.wrapping_neg())),
            Val::Real(n) => Ok(Val::Real(-n)),
            val => Err(error!(NotConstant, &val.to_string(), ..&pos)),
        }
    }

    fn import(&mut self) -> Result<()> {
        self.next();
        let mut names: Vec<(Rc<str>, Position)> = vec![];
        loop {
            let (name, pos) = self.ident()?;
            if names.iter().any(|(n, _)| *n == name) {
                return Err(error!(DuplicateDeclaration, &name, ..&pos));
            }
            names.push((name, pos));
            if !self.accept(&Token::Comma) {
                break;
            }
        }
        let from = if self.accept(&Token::Word(Word::From)) {
            Some(self.ident()?)
        } else {
            None
        };
        self.expect(Token::Semicolon)?;
        for (name, pos) in names {
            if self.program.symbols.contains_key(&name) {
                return Err(error!(AlreadyDeclared, &name, ..&pos));
            }
            let id = match &from {
                Some((script, spos)) => self.exported(script, spos, &name, &pos)?,
                None => match self.globals.shared(&name) {
                    Some(id) => id,
                    None if self.globals.contains(&name) => {
                        return Err(error!(NotShared, &name, ..&pos))
                    }
                    None => return Err(error!(NotExported, &name, ..&pos)),
                },
            };
            let ty = match self.shared.get(id) {
                Some(entry) => entry.ty.clone(),
                None => return Err(error!(InternalError, &name, ..&pos)),
            };
            let slot = self.add_slot(Slot::Shared(id));
            self.program.references.push(id);
            self.program.symbols.insert(
                name,
                Symbol::Variable(Variable {
                    ty,
                    slot,
                    shared: Some(id),
                    imported: true,
                    }),
            );
        }
        if let Some((script, _)) = from {
            self.program.imports.insert(script.clone());
            self.program.subscripts.insert(script);
        }
        Ok(())
    }

    fn exported(
        &self,
        script: &Rc<str>,
        spos: &Position,
        name: &str,
        pos: &Position,
    ) -> Result<SharedId> {
        if *script == self.unit || self.units.subscript_relation(script, &self.unit) {
            return Err(error!(CyclicImport, script, ..spos));
        }
        if !self.units.contains(script) {
            return Err(error!(ScriptNotFound, script, ..spos));
        }
        match self.units.exports(script).and_then(|e| e.get(name)) {
            Some(id) => Ok(*id),
            None => Err(error!(NotExported, name, ..pos)),
        }
    }

    fn if_statement(&mut self) -> Result<()> {
        let pos = self.peek_position();
        self.next();
        self.expect(Token::LParen)?;
        let mut link = Link::new();
        let cpos = self.peek_position();
        let ty = self.expression(&mut link)?;
        if ty != Type::Integer {
            return Err(error!(ExpectedInteger, "if", ..&cpos));
        }
        self.expect(Token::RParen)?;
        let cond = self.emit(Kind::CondJump(0), link, pos)?;
        self.enter()?;
        self.statement()?;
        if self.peek() == Some(&Token::Word(Word::Else)) {
            let epos = self.peek_position();
            self.next();
            let jump = self.emit(Kind::Jump(0), Link::new(), epos)?;
            self.resolve(cond);
            self.statement()?;
            self.resolve(jump);
        } else {
            self.resolve(cond);
        }
        self.leave();
        Ok(())
    }

    fn assignment(&mut self) -> Result<()> {
        let (name, pos) = self.ident()?;
        let var = match self.lookup(&name) {
            Some(Symbol::Variable(var)) => var,
            Some(_) => return Err(error!(NotVariable, &name, ..&pos)),
            None => return Err(error!(NotDeclared, &name, ..&pos)),
        };
        if var.imported {
            return Err(error!(AssignToImport, &name, ..&pos));
        }
        let mut link = Link::new();
        let mut ty = var.ty.clone();
        let mut path = 0;
        loop {
            let at = self.peek_position();
            match self.peek() {
                Some(Token::LBracket) => {
                    self.next();
                    let ipos = self.peek_position();
                    if self.expression(&mut link)? != Type::Integer {
                        return Err(error!(ExpectedInteger, "[]", ..&ipos));
                    }
                    self.expect(Token::RBracket)?;
                    ty = match ty.element() {
                        Some(ty) => ty,
                        None => return Err(error!(NotIndexable, &name, ..&at)),
                    };
                }
                Some(Token::Dot) => {
                    self.next();
                    let (field, fpos) = self.ident()?;
                    let found = match &ty {
                        Type::Record(rec) => rec.field(&field).map(|(i, t)| (i, t.clone())),
                        _ => None,
                    };
                    let (index, fty) = match found {
                        Some(found) => found,
                        None => return Err(error!(NoMember, &field, ..&fpos)),
                    };
                    link.immed(Val::Integer(index as i32))?;
                    ty = fty;
                }
                _ => break,
            }
            path += 1;
        }
        self.expect(Token::Assign)?;
        self.value(&mut link, &ty, &name)?;
        self.expect(Token::Semicolon)?;
        self.emit(
            Kind::Assignment(Target::Slot {
                slot: var.slot,
                path,
            }),
            link,
            pos,
        )?;
        Ok(())
    }

    fn expression_statement(&mut self) -> Result<()> {
        let pos = self.peek_position();
        let mut link = Link::new();
        let ty = self.expression(&mut link)?;
        self.expect(Token::Semicolon)?;
        let target = if ty == Type::Integer {
            Target::Slot {
                slot: RESULT_SLOT,
                path: 0,
            }
        } else {
            Target::Discard
        };
        self.emit(Kind::Assignment(target), link, pos)?;
        Ok(())
    }

    /// The right hand side of an assignment: a plain expression or a
    /// chain of guarded values.
    fn value(&mut self, link: &mut Link, target: &Type, name: &str) -> Result<()> {
        if self.peek() != Some(&Token::Word(Word::When)) {
            return self.branch(link, target, name);
        }
        let base = link.depth();
        while self.accept(&Token::Word(Word::When)) {
            let cpos = self.peek_position();
            if self.expression(link)? != Type::Integer {
                return Err(error!(ExpectedInteger, "when", ..&cpos));
            }
            self.expect(Token::Colon)?;
            link.open_guard()?;
            self.branch(link, target, name)?;
            link.close_guard()?;
            link.set_depth(base);
        }
        if self.accept(&Token::Word(Word::Else)) {
            link.immed(Val::Integer(1))?;
            link.open_guard()?;
            self.branch(link, target, name)?;
            link.close_guard()?;
        }
        link.set_depth(base + 1);
        Ok(())
    }

    fn branch(&mut self, link: &mut Link, target: &Type, name: &str) -> Result<()> {
        let pos = self.peek_position();
        let ty = self.expression(link)?;
        if target.assignable(&ty) {
            Ok(())
        } else {
            Err(error!(AssignmentMismatch, name, ..&pos))
        }
    }

    fn expression(&mut self, link: &mut Link) -> Result<Type> {
        self.enter()?;
        let ty = self.binary(link, 1)?;
        self.leave();
        Ok(ty)
    }

    fn binary(&mut self, link: &mut Link, min: usize) -> Result<Type> {
        let mut lhs = self.unary(link)?;
        loop {
            let (prec, op) = match binary_operation(self.peek()) {
                Some((prec, op)) if prec >= min => (prec, op),
                _ => return Ok(lhs),
            };
            let pos = self.peek_position();
            self.next();
            let rhs = self.binary(link, prec + 1)?;
            op.check(&lhs, &rhs).map_err(|e| e.in_position(&pos))?;
            link.push(op.opcode(), op.tag(&lhs, &rhs), 2, 1)?;
            lhs = op.result_type(&lhs, &rhs);
        }
    }

    fn unary(&mut self, link: &mut Link) -> Result<Type> {
        let op = match self.peek() {
            Some(Token::Operator(Operator::Minus)) => Operation::Negate,
            Some(Token::Operator(Operator::Plus)) => Operation::Sign,
            Some(Token::Operator(Operator::Bang)) => Operation::Not,
            _ => return self.postfix(link),
        };
        let pos = self.peek_position();
        self.next();
        if op == Operation::Negate {
            if let Some(Token::Integer(n)) = self.peek() {
                let n = *n;
                let ipos = self.peek_position();
                self.next();
                link.immed(Val::Integer(int_literal(-n, &ipos)?))?;
                return Ok(Type::Integer);
            }
        }
        self.enter()?;
        let ty = self.unary(link)?;
        self.leave();
        op.check(&ty, &ty).map_err(|e| e.in_position(&pos))?;
        link.push(op.opcode(), op.tag(&ty, &ty), 1, 1)?;
        Ok(op.result_type(&ty, &ty))
    }

    fn postfix(&mut self, link: &mut Link) -> Result<Type> {
        let mut ty = self.primary(link)?;
        loop {
            let pos = self.peek_position();
            match self.peek() {
                Some(Token::LBracket) => {
                    self.next();
                    let index = self.expression(link)?;
                    self.expect(Token::RBracket)?;
                    let op = Operation::Take;
                    op.check(&ty, &index).map_err(|e| e.in_position(&pos))?;
                    match ty {
                        Type::Array(_) => link.push(Opcode::Index, None, 2, 1)?,
                        _ => link.push(op.opcode(), op.tag(&ty, &index), 2, 1)?,
                    }
                    ty = op.result_type(&ty, &index);
                }
                Some(Token::Dot) => {
                    self.next();
                    let (field, fpos) = self.ident()?;
                    let selector = Type::Selector(field.clone());
                    let op = Operation::Member;
                    op.check(&ty, &selector).map_err(|e| e.in_position(&fpos))?;
                    let index = match &ty {
                        Type::Record(rec) => rec.field(&field).map(|(i, _)| i),
                        _ => None,
                    };
                    match index {
                        Some(index) => {
                            link.push(Opcode::Member, None, 1, 1)?;
                            link.operand(index);
                        }
                        None => return Err(error!(NoMember, &field, ..&fpos)),
                    }
                    ty = op.result_type(&ty, &selector);
                }
                _ => return Ok(ty),
            }
        }
    }

    fn primary(&mut self, link: &mut Link) -> Result<Type> {
        let pos = self.peek_position();
        let token = match self.next() {
            Some((token, _)) => token,
            None => return Err(error!(Expected, "expression", ..&pos)),
        };
        match token {
            Token::Integer(n) => {
                link.immed(Val::Integer(int_literal(n, &pos)?))?;
                Ok(Type::Integer)
            }
            Token::Real(n) => {
                link.immed(Val::Real(n))?;
                Ok(Type::Real)
            }
            Token::Text(s) => {
                link.immed(Val::Text(s))?;
                Ok(Type::Text)
            }
            Token::LParen => {
                let ty = self.expression(link)?;
                self.expect(Token::RParen)?;
                Ok(ty)
            }
            Token::LBracket => self.components(link, pos),
            Token::LBrace => self.list(link),
            Token::Ident(name) => {
                if self.peek() == Some(&Token::LParen) {
                    return self.call(link, &name, pos);
                }
                match self.lookup(&name) {
                    Some(Symbol::Variable(var)) => {
                        link.push(Opcode::Var, None, 0, 1)?;
                        link.operand(var.slot);
                        Ok(var.ty)
                    }
                    Some(Symbol::Constant(val)) => {
                        let ty = val.ty();
                        link.immed(val)?;
                        Ok(ty)
                    }
                    Some(_) => Err(error!(NotVariable, &name, ..&pos)),
                    None => Err(error!(NotDeclared, &name, ..&pos)),
                }
            }
            token => Err(error!(Unexpected, &token.to_string(), ..&pos)),
        }
    }

    /// `[a, b, c, d]` builds a vector from numbers or a matrix from columns.
    fn components(&mut self, link: &mut Link, pos: Position) -> Result<Type> {
        let mut types = vec![];
        loop {
            types.push(self.expression(link)?);
            if !self.accept(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBracket)?;
        if types.len() != 4 {
            return Err(error!(WrongComponents, "[]", ..&pos));
        }
        if types.iter().all(Type::is_numeric) {
            link.push(Opcode::Vector, None, 4, 1)?;
            Ok(Type::Vector)
        } else if types.iter().all(|t| *t == Type::Vector) {
            link.push(Opcode::Matrix, None, 4, 1)?;
            Ok(Type::Matrix)
        } else {
            Err(error!(ExpressionMismatch, "[]", ..&pos))
        }
    }

    fn list(&mut self, link: &mut Link) -> Result<Type> {
        let mut types = vec![];
        if !self.accept(&Token::RBrace) {
            loop {
                types.push(self.expression(link)?);
                if !self.accept(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RBrace)?;
        }
        link.push(Opcode::List, None, types.len(), 1)?;
        link.operand(types.len());
        if types.is_empty() {
            Ok(Type::Null)
        } else {
            Ok(Type::Record(Rc::new(RecordType::from_list(types))))
        }
    }

    fn call(&mut self, link: &mut Link, name: &str, pos: Position) -> Result<Type> {
        let (index, function) = match self.lookup(name) {
            Some(Symbol::Function(index, function)) => (index, function),
            Some(_) => return Err(error!(NotFunction, name, ..&pos)),
            None => return Err(error!(NotDeclared, name, ..&pos)),
        };
        self.expect(Token::LParen)?;
        let mut args: Vec<(Type, Position)> = vec![];
        let mut literal = None;
        if !self.accept(&Token::RParen) {
            loop {
                let apos = self.peek_position();
                let start = link.len();
                let ty = self.expression(link)?;
                if args.is_empty() {
                    literal = link.literal_since(start);
                }
                args.push((ty, apos));
                if !self.accept(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen)?;
        }
        let params = function.args();
        if params.len() != args.len() {
            return Err(error!(WrongArgumentCount, name, ..&pos));
        }
        for (param, (ty, apos)) in params.iter().zip(args.iter()) {
            if !param.assignable(ty) {
                return Err(error!(IncompatibleArguments, name, ..apos));
            }
        }
        if function.name() == Dispatcher::NAME {
            if let Some(script) = literal {
                if script != self.unit {
                    self.program.subscripts.insert(script);
                }
            }
        }
        link.push(Opcode::Fun, None, args.len(), 1)?;
        link.operand(index);
        link.operand(args.len());
        Ok(function.ret())
    }
}
