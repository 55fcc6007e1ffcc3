//! Recursive-descent parser: token stream -> AST (§4.5). Precedence is
//! encoded by the call chain `Expr -> Or -> And -> Cmp -> Add -> Mul ->
//! Primary`; the parser carries no state beyond a position cursor (§4.7).

use tracing::trace;

use crate::catalog::Catalog;
use crate::decimal::Decimal;
use crate::error::{SqlError, SqlResult};
use crate::value::{DataType, Value};

use super::ast::*;
use super::lexer::{Lexer, Token, TokenKind};

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    catalog: &'a Catalog,
}

/// Parses a single statement, resolving INSERT's implicit column list
/// against `catalog` (§4.5 "Missing column list on INSERT").
pub fn parse_statement(sql: &str, catalog: &Catalog) -> SqlResult<Statement> {
    let tokens = Lexer::tokenize(sql)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        catalog,
    };
    let stmt = parser.parse_statement()?;
    parser.expect_end()?;
    Ok(stmt)
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        trace!(kind = ?token.kind, text = %token.text, "token consumed");
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(&kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> SqlResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            let found = self.peek().clone();
            Err(SqlError::syntax_error(
                format!("expected {kind:?}, found {:?} ('{}')", found.kind, found.text),
                found.line,
                found.column,
            ))
        }
    }

    fn expect_identifier(&mut self) -> SqlResult<String> {
        if self.check(&TokenKind::Identifier) {
            Ok(self.advance().text)
        } else {
            let found = self.peek().clone();
            Err(SqlError::syntax_error(
                format!("expected identifier, found '{}'", found.text),
                found.line,
                found.column,
            ))
        }
    }

    fn expect_end(&mut self) -> SqlResult<()> {
        self.eat(TokenKind::Semicolon);
        if self.check(&TokenKind::Eof) {
            Ok(())
        } else {
            let found = self.peek().clone();
            Err(SqlError::syntax_error(
                format!("unexpected trailing input near '{}'", found.text),
                found.line,
                found.column,
            ))
        }
    }

    fn syntax_error(&self, message: impl Into<String>) -> SqlError {
        let token = self.peek();
        SqlError::syntax_error(message, token.line, token.column)
    }

    fn parse_statement(&mut self) -> SqlResult<Statement> {
        match self.peek_kind() {
            TokenKind::Select => self.parse_select().map(Statement::Select),
            TokenKind::Insert => self.parse_insert().map(Statement::Insert),
            TokenKind::Update => self.parse_update().map(Statement::Update),
            TokenKind::Delete => self.parse_delete().map(Statement::Delete),
            TokenKind::Create => self.parse_create_table().map(Statement::CreateTable),
            TokenKind::Drop => self.parse_drop_table().map(Statement::DropTable),
            _ => {
                let found = self.peek().clone();
                Err(SqlError::syntax_error(
                    format!("expected a statement, found '{}'", found.text),
                    found.line,
                    found.column,
                ))
            }
        }
    }

    // ---- SELECT --------------------------------------------------------

    fn parse_select(&mut self) -> SqlResult<SelectStmt> {
        self.expect(TokenKind::Select)?;
        let columns = self.parse_select_list()?;
        self.expect(TokenKind::From)?;
        let table_name = self.expect_identifier()?;
        let alias = self.parse_optional_table_alias()?;
        let table = TableReference {
            name: table_name,
            alias,
        };

        let where_clause = if self.eat(TokenKind::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let group_by = if self.eat(TokenKind::Group) {
            self.expect(TokenKind::By)?;
            self.parse_identifier_list()?
        } else {
            Vec::new()
        };

        let having = if self.eat(TokenKind::Having) {
            if group_by.is_empty() {
                return Err(self.syntax_error("HAVING requires a GROUP BY clause"));
            }
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(SelectStmt {
            columns,
            table,
            where_clause,
            group_by,
            having,
        })
    }

    fn parse_optional_table_alias(&mut self) -> SqlResult<Option<String>> {
        if self.eat(TokenKind::As) {
            Ok(Some(self.expect_identifier()?))
        } else if self.check(&TokenKind::Identifier) {
            Ok(Some(self.advance().text))
        } else {
            Ok(None)
        }
    }

    fn parse_select_list(&mut self) -> SqlResult<Vec<SelectItem>> {
        let mut items = vec![self.parse_select_item()?];
        while self.eat(TokenKind::Comma) {
            items.push(self.parse_select_item()?);
        }
        Ok(items)
    }

    fn parse_select_item(&mut self) -> SqlResult<SelectItem> {
        if self.check(&TokenKind::Star) {
            self.advance();
            return Ok(SelectItem::Wildcard);
        }
        let expr = self.parse_expr()?;
        let alias = if self.eat(TokenKind::As) {
            Some(self.expect_identifier()?)
        } else if self.check(&TokenKind::Identifier) {
            Some(self.advance().text)
        } else {
            None
        };
        Ok(SelectItem::Expr(Alias { expr, alias }))
    }

    fn parse_identifier_list(&mut self) -> SqlResult<Vec<String>> {
        let mut ids = vec![self.expect_identifier()?];
        while self.eat(TokenKind::Comma) {
            ids.push(self.expect_identifier()?);
        }
        Ok(ids)
    }

    // ---- INSERT ----------------------------------------------------------

    fn parse_insert(&mut self) -> SqlResult<InsertStmt> {
        self.expect(TokenKind::Insert)?;
        self.expect(TokenKind::Into)?;
        let table = self.expect_identifier()?;

        let columns = if self.eat(TokenKind::LParen) {
            let ids = self.parse_identifier_list()?;
            self.expect(TokenKind::RParen)?;
            Some(ids)
        } else {
            None
        };

        self.expect(TokenKind::Values)?;
        let mut values = vec![self.parse_value_tuple()?];
        while self.eat(TokenKind::Comma) {
            values.push(self.parse_value_tuple()?);
        }

        // Missing column list means "all columns in declared order" (§4.5);
        // resolving it here requires consulting the catalog, and an unknown
        // table fails with TableNotFound before any further checks.
        let columns = match columns {
            Some(cols) => Some(cols),
            None => {
                let table_meta = self.catalog.get_table(&table)?;
                Some(table_meta.columns.iter().map(|c| c.name.clone()).collect())
            }
        };

        Ok(InsertStmt {
            table,
            columns,
            values,
        })
    }

    fn parse_value_tuple(&mut self) -> SqlResult<Vec<Expr>> {
        self.expect(TokenKind::LParen)?;
        let mut values = vec![self.parse_expr()?];
        while self.eat(TokenKind::Comma) {
            values.push(self.parse_expr()?);
        }
        self.expect(TokenKind::RParen)?;
        Ok(values)
    }

    // ---- UPDATE / DELETE ---------------------------------------------------

    fn parse_update(&mut self) -> SqlResult<UpdateStmt> {
        self.expect(TokenKind::Update)?;
        let table = self.expect_identifier()?;
        self.expect(TokenKind::Set)?;
        let mut assignments = vec![self.parse_assignment()?];
        while self.eat(TokenKind::Comma) {
            assignments.push(self.parse_assignment()?);
        }
        let where_clause = if self.eat(TokenKind::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(UpdateStmt {
            table,
            assignments,
            where_clause,
        })
    }

    fn parse_assignment(&mut self) -> SqlResult<Assignment> {
        let column = self.expect_identifier()?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expr()?;
        Ok(Assignment { column, value })
    }

    fn parse_delete(&mut self) -> SqlResult<DeleteStmt> {
        self.expect(TokenKind::Delete)?;
        self.expect(TokenKind::From)?;
        let table = self.expect_identifier()?;
        let where_clause = if self.eat(TokenKind::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(DeleteStmt {
            table,
            where_clause,
        })
    }

    // ---- CREATE / DROP TABLE -----------------------------------------------

    fn parse_create_table(&mut self) -> SqlResult<CreateTableStmt> {
        self.expect(TokenKind::Create)?;
        self.expect(TokenKind::Table)?;
        let table = self.expect_identifier()?;
        self.expect(TokenKind::LParen)?;
        let mut columns = vec![self.parse_column_def()?];
        while self.eat(TokenKind::Comma) {
            columns.push(self.parse_column_def()?);
        }
        self.expect(TokenKind::RParen)?;
        Ok(CreateTableStmt { table, columns })
    }

    /// `PRIMARY KEY` is the only column-level constraint this dialect
    /// recognizes (§4.4's keyword set has no standalone `NULL` token, so
    /// there is no separate `NOT NULL` clause to parse); a primary-key
    /// column is always non-nullable, everything else is nullable.
    fn parse_column_def(&mut self) -> SqlResult<ColumnDef> {
        let name = self.expect_identifier()?;
        let data_type = self.parse_data_type()?;
        let is_primary_key = if self.eat(TokenKind::Primary) {
            self.expect(TokenKind::Key)?;
            true
        } else {
            false
        };
        Ok(ColumnDef {
            name,
            data_type,
            is_primary_key,
            is_nullable: !is_primary_key,
        })
    }

    fn parse_data_type(&mut self) -> SqlResult<DataType> {
        let token = self.advance();
        match token.kind {
            TokenKind::Int => Ok(DataType::Int),
            TokenKind::Varchar => Ok(DataType::Varchar),
            TokenKind::Text => Ok(DataType::Text),
            TokenKind::Decimal => Ok(DataType::Decimal),
            TokenKind::Boolean => Ok(DataType::Boolean),
            TokenKind::Datetime => Ok(DataType::DateTime),
            TokenKind::Date => Ok(DataType::Date),
            _ => Err(SqlError::syntax_error(
                format!("expected a column type, found '{}'", token.text),
                token.line,
                token.column,
            )),
        }
    }

    fn parse_drop_table(&mut self) -> SqlResult<DropTableStmt> {
        self.expect(TokenKind::Drop)?;
        self.expect(TokenKind::Table)?;
        let table = self.expect_identifier()?;
        Ok(DropTableStmt { table })
    }

    // ---- Expressions (precedence via call chain; §4.5) ---------------------

    fn parse_expr(&mut self) -> SqlResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> SqlResult<Expr> {
        let mut left = self.parse_and()?;
        while self.eat(TokenKind::Or) {
            let right = self.parse_and()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op: BinaryOperator::Or,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> SqlResult<Expr> {
        let mut left = self.parse_cmp()?;
        while self.eat(TokenKind::And) {
            let right = self.parse_cmp()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op: BinaryOperator::And,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_cmp(&mut self) -> SqlResult<Expr> {
        let left = self.parse_add()?;
        let op = match self.peek_kind() {
            TokenKind::Eq => BinaryOperator::Eq,
            TokenKind::NotEq => BinaryOperator::NotEq,
            TokenKind::Lt => BinaryOperator::Lt,
            TokenKind::LtEq => BinaryOperator::LtEq,
            TokenKind::Gt => BinaryOperator::Gt,
            TokenKind::GtEq => BinaryOperator::GtEq,
            TokenKind::Like => BinaryOperator::Like,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_add()?;
        Ok(Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    fn parse_add(&mut self) -> SqlResult<Expr> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_mul()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_mul(&mut self) -> SqlResult<Expr> {
        let mut left = self.parse_primary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOperator::Mul,
                TokenKind::Slash => BinaryOperator::Div,
                TokenKind::Percent => BinaryOperator::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_primary()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> SqlResult<Expr> {
        if let Some(kind) = aggregate_kind(self.peek_kind()) {
            return self.parse_aggregate(kind);
        }
        match self.peek_kind() {
            TokenKind::Number => {
                let token = self.advance();
                Ok(Expr::Literal(parse_numeric_literal(&token)?))
            }
            TokenKind::String => {
                let token = self.advance();
                Ok(Expr::Literal(Value::Text(token.text)))
            }
            TokenKind::Identifier => {
                let token = self.advance();
                Ok(Expr::Identifier(token.text))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => {
                let found = self.peek().clone();
                Err(SqlError::syntax_error(
                    format!("expected an expression, found '{}'", found.text),
                    found.line,
                    found.column,
                ))
            }
        }
    }

    fn parse_aggregate(&mut self, kind: AggregateKind) -> SqlResult<Expr> {
        self.advance();
        self.expect(TokenKind::LParen)?;
        let arg = if self.check(&TokenKind::Star) {
            if !matches!(kind, AggregateKind::Count) {
                return Err(self.syntax_error("only COUNT supports '*' as an argument"));
            }
            self.advance();
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        self.expect(TokenKind::RParen)?;
        Ok(Expr::Aggregate { kind, arg })
    }
}

fn aggregate_kind(kind: &TokenKind) -> Option<AggregateKind> {
    Some(match kind {
        TokenKind::Count => AggregateKind::Count,
        TokenKind::Sum => AggregateKind::Sum,
        TokenKind::Avg => AggregateKind::Avg,
        TokenKind::Min => AggregateKind::Min,
        TokenKind::Max => AggregateKind::Max,
        _ => return None,
    })
}

/// A numeric literal with no `.` is an integer literal; one with exactly one
/// `.` is a decimal literal. Anything else (e.g. repeated dots, per §9's open
/// question) is rejected here rather than at the lexer.
fn parse_numeric_literal(token: &Token) -> SqlResult<Value> {
    if !token.text.contains('.') {
        if let Ok(i) = token.text.parse::<i32>() {
            return Ok(Value::Integer(i));
        }
    }
    token
        .text
        .parse::<Decimal>()
        .map(Value::Decimal)
        .map_err(|_| SqlError::syntax_error(
            format!("malformed numeric literal '{}'", token.text),
            token.line,
            token.column,
        ))
}
