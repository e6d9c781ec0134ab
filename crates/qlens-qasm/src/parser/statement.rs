//! Statement parsing.

use super::Parser;
use crate::ast::{GateCall, GateDef, Operand, Statement, StatementKind};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let pos = self.position();
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("statement".into()))?;

        let kind = match token {
            Token::Include => self.parse_include()?,
            Token::Qreg => self.parse_register_decl(true)?,
            Token::Creg => self.parse_register_decl(false)?,
            Token::Qubit => self.parse_typed_decl(true)?,
            Token::Bit => self.parse_typed_decl(false)?,
            Token::Gate => self.parse_gate_def()?,
            Token::Opaque => self.parse_opaque()?,
            Token::Measure => self.parse_measure()?,
            Token::Reset => self.parse_reset()?,
            Token::Barrier => self.parse_barrier()?,
            Token::If => self.parse_if()?,
            Token::For | Token::While | Token::Def | Token::Else => {
                return Err(ParseError::Unsupported {
                    pos,
                    feature: format!("'{token}' statement"),
                });
            }
            Token::Identifier(_) => self.parse_identifier_statement()?,
            _ => return Err(self.unexpected("statement")),
        };

        Ok(Statement { pos, kind })
    }

    fn parse_include(&mut self) -> ParseResult<StatementKind> {
        self.expect(&Token::Include)?;
        let file = match self.peek() {
            Some(Token::StringLiteral(s)) => s.clone(),
            _ => return Err(self.unexpected("file name")),
        };
        self.advance();
        self.expect(&Token::Semicolon)?;
        Ok(StatementKind::Include(file))
    }

    /// `qreg name[size];` / `creg name[size];`
    fn parse_register_decl(&mut self, quantum: bool) -> ParseResult<StatementKind> {
        self.advance();
        let name = self.parse_identifier()?;
        self.expect(&Token::LBracket)?;
        let size = self.parse_u32()?;
        self.expect(&Token::RBracket)?;
        self.expect(&Token::Semicolon)?;
        Ok(register_decl(quantum, name, size))
    }

    /// `qubit[size] name;` / `bit name;`
    fn parse_typed_decl(&mut self, quantum: bool) -> ParseResult<StatementKind> {
        self.advance();
        let size = if self.consume(&Token::LBracket) {
            let size = self.parse_u32()?;
            self.expect(&Token::RBracket)?;
            size
        } else {
            1
        };
        let name = self.parse_identifier()?;
        self.expect(&Token::Semicolon)?;
        Ok(register_decl(quantum, name, size))
    }

    fn parse_gate_def(&mut self) -> ParseResult<StatementKind> {
        self.expect(&Token::Gate)?;
        let name = self.parse_identifier()?;
        let params = self.parse_formal_params()?;
        let qubits = self.parse_identifier_list()?;

        self.expect(&Token::LBrace)?;
        let mut body = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.is_eof() {
                return Err(ParseError::UnexpectedEof("'}'".into()));
            }
            body.push(self.parse_statement()?);
        }
        self.expect(&Token::RBrace)?;

        Ok(StatementKind::GateDef(GateDef {
            name,
            params,
            qubits,
            body,
        }))
    }

    fn parse_opaque(&mut self) -> ParseResult<StatementKind> {
        self.expect(&Token::Opaque)?;
        let name = self.parse_identifier()?;
        self.parse_formal_params()?;
        self.parse_identifier_list()?;
        self.expect(&Token::Semicolon)?;
        Ok(StatementKind::Opaque { name })
    }

    /// Optional `(a, b, ...)` after a gate name in a definition.
    fn parse_formal_params(&mut self) -> ParseResult<Vec<String>> {
        if !self.consume(&Token::LParen) {
            return Ok(vec![]);
        }
        let params = if self.check(&Token::RParen) {
            vec![]
        } else {
            self.parse_identifier_list()?
        };
        self.expect(&Token::RParen)?;
        Ok(params)
    }

    /// `measure q[0] -> c[0];`
    fn parse_measure(&mut self) -> ParseResult<StatementKind> {
        self.expect(&Token::Measure)?;
        let qubit = self.parse_operand()?;
        self.expect(&Token::Arrow)?;
        let bit = self.parse_operand()?;
        self.expect(&Token::Semicolon)?;
        Ok(StatementKind::Measure { qubit, bit })
    }

    fn parse_reset(&mut self) -> ParseResult<StatementKind> {
        self.expect(&Token::Reset)?;
        let qubits = self.parse_operands()?;
        self.expect(&Token::Semicolon)?;
        Ok(StatementKind::Reset { qubits })
    }

    fn parse_barrier(&mut self) -> ParseResult<StatementKind> {
        self.expect(&Token::Barrier)?;
        let qubits = if self.check(&Token::Semicolon) {
            vec![]
        } else {
            self.parse_operands()?
        };
        self.expect(&Token::Semicolon)?;
        Ok(StatementKind::Barrier { qubits })
    }

    /// `if (c == 1) x q[0];`
    fn parse_if(&mut self) -> ParseResult<StatementKind> {
        self.expect(&Token::If)?;
        self.expect(&Token::LParen)?;
        let register = self.parse_identifier()?;
        self.expect(&Token::EqEq)?;
        let value = match self.peek() {
            Some(Token::IntLiteral(v)) => *v,
            _ => return Err(self.unexpected("integer")),
        };
        self.advance();
        self.expect(&Token::RParen)?;
        let body = self.parse_statement()?;
        Ok(StatementKind::If {
            register,
            value,
            body: Box::new(body),
        })
    }

    /// Gate call, or a version 3 measurement `c = measure q;`.
    fn parse_identifier_statement(&mut self) -> ParseResult<StatementKind> {
        let is_assignment = matches!(self.peek_nth(1), Some(Token::Eq))
            || (matches!(self.peek_nth(1), Some(Token::LBracket))
                && matches!(self.peek_nth(4), Some(Token::Eq)));
        if is_assignment {
            let bit = self.parse_operand()?;
            self.expect(&Token::Eq)?;
            self.expect(&Token::Measure)?;
            let qubit = self.parse_operand()?;
            self.expect(&Token::Semicolon)?;
            return Ok(StatementKind::Measure { qubit, bit });
        }

        let name = self.parse_identifier()?;
        let params = if self.consume(&Token::LParen) {
            let p = self.parse_expression_list()?;
            self.expect(&Token::RParen)?;
            p
        } else {
            vec![]
        };
        let qubits = self.parse_operands()?;
        self.expect(&Token::Semicolon)?;

        Ok(StatementKind::Gate(GateCall {
            name,
            params,
            qubits,
        }))
    }

    fn parse_operands(&mut self) -> ParseResult<Vec<Operand>> {
        let mut operands = vec![self.parse_operand()?];
        while self.consume(&Token::Comma) {
            operands.push(self.parse_operand()?);
        }
        Ok(operands)
    }

    fn parse_operand(&mut self) -> ParseResult<Operand> {
        let pos = self.position();
        let register = self.parse_identifier()?;
        if self.consume(&Token::LBracket) {
            let index = self.parse_u32()?;
            self.expect(&Token::RBracket)?;
            Ok(Operand::indexed(register, index, pos))
        } else {
            Ok(Operand::whole(register, pos))
        }
    }
}

fn register_decl(quantum: bool, name: String, size: u32) -> StatementKind {
    if quantum {
        StatementKind::QregDecl { name, size }
    } else {
        StatementKind::CregDecl { name, size }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::StatementKind;
    use crate::error::ParseError;
    use crate::parser::parse_program;

    #[test]
    fn test_qasm2_and_qasm3_declarations_agree() {
        let two = parse_program("qreg q[3]; creg c[2];").unwrap();
        let three = parse_program("qubit[3] q; bit[2] c;").unwrap();
        for program in [two, three] {
            assert!(matches!(
                &program.statements[0].kind,
                StatementKind::QregDecl { name, size: 3 } if name == "q"
            ));
            assert!(matches!(
                &program.statements[1].kind,
                StatementKind::CregDecl { name, size: 2 } if name == "c"
            ));
        }
    }

    #[test]
    fn test_measure_forms() {
        let program = parse_program("measure q[0] -> c[1]; c[0] = measure q[1]; c = measure q;")
            .unwrap();
        assert_eq!(program.statements.len(), 3);
        for stmt in &program.statements {
            assert!(matches!(stmt.kind, StatementKind::Measure { .. }));
        }
        let StatementKind::Measure { qubit, bit } = &program.statements[1].kind else {
            panic!("expected measure");
        };
        assert_eq!(qubit.index, Some(1));
        assert_eq!(bit.index, Some(0));
    }

    #[test]
    fn test_gate_definition() {
        let program =
            parse_program("gate mygate(theta) a, b { rx(theta) a; cx a, b; }").unwrap();
        let StatementKind::GateDef(def) = &program.statements[0].kind else {
            panic!("expected gate definition");
        };
        assert_eq!(def.name, "mygate");
        assert_eq!(def.params, vec!["theta"]);
        assert_eq!(def.qubits, vec!["a", "b"]);
        assert_eq!(def.body.len(), 2);
    }

    #[test]
    fn test_if_statement() {
        let program = parse_program("if (c == 1) x q[0];").unwrap();
        assert!(matches!(
            &program.statements[0].kind,
            StatementKind::If { register, value: 1, .. } if register == "c"
        ));
    }

    #[test]
    fn test_loops_are_rejected() {
        let err = parse_program("for i in [0:2] { h q[i]; }").unwrap_err();
        assert!(matches!(err, ParseError::Unsupported { .. }));
    }

    #[test]
    fn test_barrier_without_operands() {
        let program = parse_program("barrier;").unwrap();
        assert!(matches!(
            &program.statements[0].kind,
            StatementKind::Barrier { qubits } if qubits.is_empty()
        ));
    }
}
