//! SQL parser implementation.

use super::error::ParseError;
use super::pratt::{
    infix_binding_power, prefix_binding_power, token_to_binary_op, token_to_unary_op,
};
use crate::ast::{Expr, FunctionCall, Literal};
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};
use crate::plan::{
    JoinClause, JoinType, LimitClause, OrderByClause, Projection, QueryPlan, QueryType,
    SelectItem,
};
use crate::value::Value;

/// SQL parser.
///
/// Single-token lookahead recursive descent for statement structure, Pratt (operator
/// precedence climbing) for expressions.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self { lexer, current }
    }

    /// Parses a single SQL statement into a [`QueryPlan`].
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input is not a valid statement in this grammar.
    pub fn parse_statement(&mut self) -> Result<QueryPlan, ParseError> {
        let plan = match &self.current.kind {
            TokenKind::Keyword(Keyword::Select) => self.parse_select()?,
            TokenKind::Keyword(Keyword::Insert) => self.parse_insert()?,
            TokenKind::Keyword(Keyword::Update) => self.parse_update()?,
            TokenKind::Keyword(Keyword::Delete) => self.parse_delete()?,
            TokenKind::Keyword(Keyword::Upsert) => self.parse_upsert()?,
            _ => {
                return Err(ParseError::unexpected(
                    "SELECT, INSERT, UPDATE, DELETE, or UPSERT",
                    self.current.kind.clone(),
                    self.current.span,
                ))
            }
        };
        if self.check(&TokenKind::Semicolon) {
            self.advance();
        }
        if !self.check(&TokenKind::Eof) {
            return Err(ParseError::unexpected(
                "end of statement",
                self.current.kind.clone(),
                self.current.span,
            ));
        }
        Ok(plan)
    }

    // --- SELECT ---

    fn parse_select(&mut self) -> Result<QueryPlan, ParseError> {
        self.expect_keyword(Keyword::Select)?;
        let projection = self.parse_projection()?;
        self.expect_keyword(Keyword::From)?;
        let table = self.expect_identifier()?;
        let alias = self.parse_optional_alias()?;

        let mut plan = QueryPlan::new(QueryType::Select, table);
        plan.alias = alias;
        plan.projection = projection;
        plan.joins = self.parse_joins()?;
        plan.filter = self.parse_optional_where()?;
        plan.group_by = self.parse_optional_group_by()?;
        plan.order_by = self.parse_optional_order_by()?;
        plan.limit = self.parse_optional_limit()?;
        Ok(plan)
    }

    fn parse_projection(&mut self) -> Result<Projection, ParseError> {
        if self.check(&TokenKind::Star) {
            self.advance();
            return Ok(Projection::Wildcard);
        }
        let mut items = Vec::new();
        loop {
            let expr = self.parse_expression(0)?;
            let implicit = expr.implicit_alias();
            let alias = if self.check_keyword(Keyword::As) {
                self.advance();
                Some(self.expect_identifier()?)
            } else if let TokenKind::Identifier(name) = &self.current.kind {
                let name = name.clone();
                self.advance();
                Some(name)
            } else {
                None
            };
            items.push(SelectItem {
                expr,
                alias: alias.or(Some(implicit)),
            });
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(Projection::Items(items))
    }

    fn parse_joins(&mut self) -> Result<Vec<JoinClause>, ParseError> {
        let mut joins = Vec::new();
        loop {
            let kind = if self.check_keyword(Keyword::Join) {
                self.advance();
                JoinType::Inner
            } else if self.check_keyword(Keyword::Inner) {
                self.advance();
                self.expect_keyword(Keyword::Join)?;
                JoinType::Inner
            } else if self.check_keyword(Keyword::Left) {
                self.advance();
                if self.check_keyword(Keyword::Outer) {
                    self.advance();
                }
                self.expect_keyword(Keyword::Join)?;
                JoinType::Left
            } else if self.check_keyword(Keyword::Right) {
                self.advance();
                if self.check_keyword(Keyword::Outer) {
                    self.advance();
                }
                self.expect_keyword(Keyword::Join)?;
                JoinType::Right
            } else if self.check_keyword(Keyword::Full) {
                self.advance();
                if self.check_keyword(Keyword::Outer) {
                    self.advance();
                }
                self.expect_keyword(Keyword::Join)?;
                JoinType::Full
            } else if self.check_keyword(Keyword::Outer) {
                self.advance();
                self.expect_keyword(Keyword::Join)?;
                JoinType::Outer
            } else {
                break;
            };

            let table = self.expect_identifier()?;
            let alias = self.parse_optional_alias()?;
            self.expect_keyword(Keyword::On)?;
            let on = self.parse_expression(0)?;
            joins.push(JoinClause {
                kind,
                table,
                alias,
                on,
            });
        }
        Ok(joins)
    }

    fn parse_optional_where(&mut self) -> Result<Option<Expr>, ParseError> {
        if self.check_keyword(Keyword::Where) {
            self.advance();
            Ok(Some(self.parse_expression(0)?))
        } else {
            Ok(None)
        }
    }

    fn parse_optional_group_by(&mut self) -> Result<Vec<String>, ParseError> {
        if self.check_keyword(Keyword::Group) {
            self.advance();
            self.expect_keyword(Keyword::By)?;
            self.parse_identifier_list()
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_optional_order_by(&mut self) -> Result<Vec<OrderByClause>, ParseError> {
        if !self.check_keyword(Keyword::Order) {
            return Ok(Vec::new());
        }
        self.advance();
        self.expect_keyword(Keyword::By)?;
        let mut clauses = Vec::new();
        loop {
            let column = self.expect_identifier()?;
            let desc = if self.check_keyword(Keyword::Desc) {
                self.advance();
                true
            } else if self.check_keyword(Keyword::Asc) {
                self.advance();
                false
            } else {
                false
            };
            clauses.push(OrderByClause { column, desc });
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(clauses)
    }

    /// Parses `LIMIT count` or the combined `LIMIT offset, count` form.
    fn parse_optional_limit(&mut self) -> Result<Option<LimitClause>, ParseError> {
        if !self.check_keyword(Keyword::Limit) {
            return Ok(None);
        }
        self.advance();
        let first = self.expect_integer()?;
        if self.check(&TokenKind::Comma) {
            self.advance();
            let count = self.expect_integer()?;
            Ok(Some(LimitClause {
                offset: first as usize,
                count: count as usize,
            }))
        } else {
            let mut offset = 0usize;
            if self.check_keyword(Keyword::Offset) {
                self.advance();
                offset = self.expect_integer()? as usize;
            }
            Ok(Some(LimitClause {
                offset,
                count: first as usize,
            }))
        }
    }

    // --- INSERT / UPSERT ---

    fn parse_insert(&mut self) -> Result<QueryPlan, ParseError> {
        self.expect_keyword(Keyword::Insert)?;
        self.parse_insert_body(QueryType::Insert)
    }

    fn parse_upsert(&mut self) -> Result<QueryPlan, ParseError> {
        self.expect_keyword(Keyword::Upsert)?;
        self.parse_insert_body(QueryType::Upsert)
    }

    fn parse_insert_body(&mut self, kind: QueryType) -> Result<QueryPlan, ParseError> {
        if self.check_keyword(Keyword::Into) {
            self.advance();
        }
        let table = self.expect_identifier()?;

        let mut columns = Vec::new();
        if self.check(&TokenKind::LeftParen) {
            self.advance();
            columns = self.parse_identifier_list()?;
            self.expect(&TokenKind::RightParen)?;
        }

        self.expect_keyword(Keyword::Values)?;
        let mut rows = Vec::new();
        loop {
            self.expect(&TokenKind::LeftParen)?;
            rows.push(self.parse_literal_list()?);
            self.expect(&TokenKind::RightParen)?;
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        let mut plan = QueryPlan::new(kind, table);
        plan.insert_columns = columns;
        plan.insert_values = rows;
        Ok(plan)
    }

    fn parse_literal_list(&mut self) -> Result<Vec<Value>, ParseError> {
        let mut values = Vec::new();
        loop {
            values.push(self.parse_literal_value()?);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(values)
    }

    fn parse_literal_value(&mut self) -> Result<Value, ParseError> {
        let negate = if self.check(&TokenKind::Minus) {
            self.advance();
            true
        } else {
            false
        };
        let value = match &self.current.kind {
            TokenKind::Integer(n) => {
                let n = *n;
                self.advance();
                Value::Integer(if negate { -n } else { n })
            }
            TokenKind::Float(f) => {
                let f = *f;
                self.advance();
                Value::Float(if negate { -f } else { f })
            }
            TokenKind::String(s) => {
                let s = s.clone();
                self.advance();
                Value::Text(s)
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Value::Null
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Value::Boolean(true)
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Value::Boolean(false)
            }
            _ => {
                return Err(ParseError::unexpected(
                    "a literal value",
                    self.current.kind.clone(),
                    self.current.span,
                ))
            }
        };
        Ok(value)
    }

    // --- UPDATE ---

    fn parse_update(&mut self) -> Result<QueryPlan, ParseError> {
        self.expect_keyword(Keyword::Update)?;
        let table = self.expect_identifier()?;
        self.expect_keyword(Keyword::Set)?;

        let mut set_clauses = Vec::new();
        loop {
            let column = self.expect_identifier()?;
            self.expect(&TokenKind::Eq)?;
            let value = self.parse_expression(0)?;
            set_clauses.push((column, value));
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        let mut plan = QueryPlan::new(QueryType::Update, table);
        plan.set_clauses = set_clauses;
        plan.filter = self.parse_optional_where()?;
        Ok(plan)
    }

    // --- DELETE ---

    fn parse_delete(&mut self) -> Result<QueryPlan, ParseError> {
        self.expect_keyword(Keyword::Delete)?;
        if self.check_keyword(Keyword::From) {
            self.advance();
        }
        let table = self.expect_identifier()?;
        let mut plan = QueryPlan::new(QueryType::Delete, table);
        plan.filter = self.parse_optional_where()?;
        Ok(plan)
    }

    // --- shared bits ---

    fn parse_optional_alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.check_keyword(Keyword::As) {
            self.advance();
            Ok(Some(self.expect_identifier()?))
        } else if let TokenKind::Identifier(name) = &self.current.kind {
            let name = name.clone();
            self.advance();
            Ok(Some(name))
        } else {
            Ok(None)
        }
    }

    // --- expressions ---

    /// Parses an expression using Pratt (operator precedence) climbing.
    ///
    /// `BETWEEN a AND b` desugars here into `expr >= a AND expr <= b` (§4.3).
    fn parse_expression(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let (l_bp, r_bp) = match infix_binding_power(&self.current.kind) {
                Some(bp) => bp,
                None => break,
            };
            if l_bp < min_bp {
                break;
            }

            match &self.current.kind {
                TokenKind::Keyword(Keyword::Is) => {
                    self.advance();
                    let negated = if self.check_keyword(Keyword::Not) {
                        self.advance();
                        true
                    } else {
                        false
                    };
                    self.expect_keyword(Keyword::Null)?;
                    lhs = Expr::IsNull {
                        expr: Box::new(lhs),
                        negated,
                    };
                }
                TokenKind::Keyword(Keyword::Not) => {
                    self.advance();
                    if self.check_keyword(Keyword::In) {
                        self.advance();
                        self.expect(&TokenKind::LeftParen)?;
                        let list = self.parse_expression_list()?;
                        self.expect(&TokenKind::RightParen)?;
                        lhs = Expr::In {
                            expr: Box::new(lhs),
                            list,
                            negated: true,
                        };
                    } else if self.check_keyword(Keyword::Between) {
                        self.advance();
                        lhs = self.parse_between_tail(lhs, r_bp, true)?;
                    } else if self.check_keyword(Keyword::Like) {
                        self.advance();
                        let rhs = self.parse_expression(r_bp)?;
                        let like = Expr::Binary {
                            left: Box::new(lhs),
                            op: crate::ast::BinaryOp::Like,
                            right: Box::new(rhs),
                        };
                        lhs = Expr::Unary {
                            op: crate::ast::UnaryOp::Not,
                            operand: Box::new(like),
                        };
                    } else {
                        return Err(ParseError::unexpected(
                            "IN, BETWEEN, or LIKE after NOT",
                            self.current.kind.clone(),
                            self.current.span,
                        ));
                    }
                }
                TokenKind::Keyword(Keyword::In) => {
                    self.advance();
                    self.expect(&TokenKind::LeftParen)?;
                    let list = self.parse_expression_list()?;
                    self.expect(&TokenKind::RightParen)?;
                    lhs = Expr::In {
                        expr: Box::new(lhs),
                        list,
                        negated: false,
                    };
                }
                TokenKind::Keyword(Keyword::Between) => {
                    self.advance();
                    lhs = self.parse_between_tail(lhs, r_bp, false)?;
                }
                _ => {
                    if let Some(op) = token_to_binary_op(&self.current.kind) {
                        self.advance();
                        let rhs = self.parse_expression(r_bp)?;
                        lhs = Expr::Binary {
                            left: Box::new(lhs),
                            op,
                            right: Box::new(rhs),
                        };
                    } else {
                        break;
                    }
                }
            }
        }

        Ok(lhs)
    }

    /// `expr BETWEEN low AND high` desugars to `(expr >= low) AND (expr <= high)`, negated
    /// to `(expr < low) OR (expr > high)` for `NOT BETWEEN`.
    fn parse_between_tail(
        &mut self,
        lhs: Expr,
        r_bp: u8,
        negated: bool,
    ) -> Result<Expr, ParseError> {
        let low = self.parse_expression(r_bp)?;
        self.expect_keyword(Keyword::And)?;
        let high = self.parse_expression(r_bp)?;
        if negated {
            Ok(Expr::Binary {
                left: Box::new(Expr::Binary {
                    left: Box::new(lhs.clone()),
                    op: crate::ast::BinaryOp::Lt,
                    right: Box::new(low),
                }),
                op: crate::ast::BinaryOp::Or,
                right: Box::new(Expr::Binary {
                    left: Box::new(lhs),
                    op: crate::ast::BinaryOp::Gt,
                    right: Box::new(high),
                }),
            })
        } else {
            Ok(Expr::Binary {
                left: Box::new(Expr::Binary {
                    left: Box::new(lhs.clone()),
                    op: crate::ast::BinaryOp::GtEq,
                    right: Box::new(low),
                }),
                op: crate::ast::BinaryOp::And,
                right: Box::new(Expr::Binary {
                    left: Box::new(lhs),
                    op: crate::ast::BinaryOp::LtEq,
                    right: Box::new(high),
                }),
            })
        }
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        if let Some(op) = token_to_unary_op(&self.current.kind) {
            let bp = prefix_binding_power(&self.current.kind).unwrap_or(15);
            self.advance();
            let operand = self.parse_expression(bp)?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current.clone();

        match &token.kind {
            TokenKind::Integer(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Integer(*n)))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Expr::Literal(Literal::Float(*f)))
            }
            TokenKind::String(s) => {
                let value = s.clone();
                self.advance();
                Ok(Expr::Literal(Literal::String(value)))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expr::Literal(Literal::Boolean(true)))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expr::Literal(Literal::Boolean(false)))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression(0)?;
                self.expect(&TokenKind::RightParen)?;
                Ok(expr)
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                if self.check(&TokenKind::LeftParen) {
                    return self.parse_function_call(name);
                }
                if self.check(&TokenKind::Dot) {
                    self.advance();
                    if self.check(&TokenKind::Star) {
                        self.advance();
                        return Ok(Expr::Column {
                            table: Some(name),
                            name: "*".to_string(),
                        });
                    }
                    let column = self.expect_identifier()?;
                    return Ok(Expr::qualified_column(name, column));
                }
                Ok(Expr::column(name))
            }
            _ => Err(ParseError::unexpected(
                "an expression",
                token.kind.clone(),
                token.span,
            )),
        }
    }

    fn parse_function_call(&mut self, name: String) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let mut args = Vec::new();
        if self.check(&TokenKind::Star) {
            self.advance();
            args.push(Expr::Column {
                table: None,
                name: "*".to_string(),
            });
        } else if !self.check(&TokenKind::RightParen) {
            args = self.parse_expression_list()?;
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Function(FunctionCall { name, args }))
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![];
        loop {
            exprs.push(self.parse_expression(0)?);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(exprs)
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut idents = vec![];
        loop {
            idents.push(self.expect_identifier()?);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(idents)
    }

    // --- token helpers ---

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current.kind, TokenKind::Keyword(kw) if *kw == keyword)
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected(
                format!("{kind:?}"),
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected(
                keyword.as_str(),
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::unexpected(
                "identifier",
                self.current.kind.clone(),
                self.current.span,
            )),
        }
    }

    fn expect_integer(&mut self) -> Result<i64, ParseError> {
        match &self.current.kind {
            TokenKind::Integer(n) => {
                let n = *n;
                self.advance();
                Ok(n)
            }
            _ => Err(ParseError::unexpected(
                "an integer",
                self.current.kind.clone(),
                self.current.span,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;

    fn parse(sql: &str) -> Result<QueryPlan, ParseError> {
        Parser::new(sql).parse_statement()
    }

    #[test]
    fn test_simple_select() {
        let plan = parse("SELECT id, name FROM users").unwrap();
        assert_eq!(plan.kind, QueryType::Select);
        assert_eq!(plan.table, "users");
        assert!(matches!(plan.projection, Projection::Items(ref v) if v.len() == 2));
    }

    #[test]
    fn test_select_star() {
        let plan = parse("SELECT * FROM users").unwrap();
        assert!(matches!(plan.projection, Projection::Wildcard));
    }

    #[test]
    fn test_select_with_where() {
        let plan = parse("SELECT * FROM users WHERE id = 1").unwrap();
        assert!(plan.filter.is_some());
    }

    #[test]
    fn test_select_with_join() {
        let plan =
            parse("SELECT u.id, o.amount FROM users u JOIN orders o ON u.id = o.user_id").unwrap();
        assert_eq!(plan.joins.len(), 1);
        assert_eq!(plan.joins[0].kind, JoinType::Inner);
        assert_eq!(plan.alias.as_deref(), Some("u"));
    }

    #[test]
    fn test_left_outer_join() {
        let plan =
            parse("SELECT * FROM a LEFT OUTER JOIN b ON a.id = b.a_id").unwrap();
        assert_eq!(plan.joins[0].kind, JoinType::Left);
    }

    #[test]
    fn test_expression_precedence() {
        let plan = parse("SELECT 1 + 2 * 3 FROM t").unwrap();
        if let Projection::Items(items) = &plan.projection {
            if let Expr::Binary { op, right, .. } = &items[0].expr {
                assert_eq!(*op, BinaryOp::Add);
                assert!(matches!(
                    right.as_ref(),
                    Expr::Binary {
                        op: BinaryOp::Mul,
                        ..
                    }
                ));
            } else {
                panic!("expected binary expression");
            }
        } else {
            panic!("expected item list");
        }
    }

    #[test]
    fn test_between_desugars_to_range_comparison() {
        let plan = parse("SELECT * FROM t WHERE age BETWEEN 18 AND 30").unwrap();
        if let Some(Expr::Binary { op, .. }) = plan.filter {
            assert_eq!(op, BinaryOp::And);
        } else {
            panic!("expected desugared AND");
        }
    }

    #[test]
    fn test_group_by_order_by_limit() {
        let plan =
            parse("SELECT city FROM users GROUP BY city ORDER BY city DESC LIMIT 5, 10").unwrap();
        assert_eq!(plan.group_by, vec!["city".to_string()]);
        assert!(plan.order_by[0].desc);
        let limit = plan.limit.unwrap();
        assert_eq!(limit.offset, 5);
        assert_eq!(limit.count, 10);
    }

    #[test]
    fn test_limit_offset_keyword_form() {
        let plan = parse("SELECT * FROM t LIMIT 10 OFFSET 20").unwrap();
        let limit = plan.limit.unwrap();
        assert_eq!(limit.offset, 20);
        assert_eq!(limit.count, 10);
    }

    #[test]
    fn test_insert_values() {
        let plan =
            parse("INSERT INTO users (name, email) VALUES ('Alice', 'alice@example.com')")
                .unwrap();
        assert_eq!(plan.kind, QueryType::Insert);
        assert_eq!(plan.table, "users");
        assert_eq!(plan.insert_columns.len(), 2);
        assert_eq!(plan.insert_values.len(), 1);
    }

    #[test]
    fn test_insert_multiple_rows() {
        let plan = parse("INSERT INTO t (a) VALUES (1), (2), (3)").unwrap();
        assert_eq!(plan.insert_values.len(), 3);
    }

    #[test]
    fn test_insert_without_into_is_allowed() {
        let plan = parse("INSERT users (name) VALUES ('Alice')").unwrap();
        assert_eq!(plan.kind, QueryType::Insert);
        assert_eq!(plan.table, "users");
    }

    #[test]
    fn test_upsert_parses_as_upsert_kind() {
        let plan = parse("UPSERT INTO t (a) VALUES (1)").unwrap();
        assert_eq!(plan.kind, QueryType::Upsert);
    }

    #[test]
    fn test_update_set_and_where() {
        let plan = parse("UPDATE users SET name = 'Bob', age = 30 WHERE id = 1").unwrap();
        assert_eq!(plan.kind, QueryType::Update);
        assert_eq!(plan.set_clauses.len(), 2);
        assert!(plan.filter.is_some());
    }

    #[test]
    fn test_delete_with_where() {
        let plan = parse("DELETE FROM users WHERE id = 1").unwrap();
        assert_eq!(plan.kind, QueryType::Delete);
        assert!(plan.filter.is_some());
    }

    #[test]
    fn test_delete_without_where_is_allowed_by_parser() {
        // Refusing unconditional writes is a write-executor safety check, not a grammar rule.
        let plan = parse("DELETE FROM users").unwrap();
        assert!(plan.filter.is_none());
    }

    #[test]
    fn test_delete_without_from_is_allowed() {
        let plan = parse("DELETE users WHERE id = 1").unwrap();
        assert_eq!(plan.kind, QueryType::Delete);
        assert_eq!(plan.table, "users");
    }

    #[test]
    fn test_function_call() {
        let plan = parse("SELECT UPPER(name) FROM users").unwrap();
        if let Projection::Items(items) = &plan.projection {
            assert!(matches!(&items[0].expr, Expr::Function(f) if f.name == "UPPER"));
        } else {
            panic!("expected item list");
        }
    }

    #[test]
    fn test_implicit_alias_for_function_call() {
        let plan = parse("SELECT UPPER(name) FROM users").unwrap();
        if let Projection::Items(items) = &plan.projection {
            assert_eq!(items[0].alias.as_deref(), Some("UPPER(name)"));
        } else {
            panic!("expected item list");
        }
    }

    #[test]
    fn test_explicit_alias_wins_over_implicit() {
        let plan = parse("SELECT name AS full_name FROM users").unwrap();
        if let Projection::Items(items) = &plan.projection {
            assert_eq!(items[0].alias.as_deref(), Some("full_name"));
        } else {
            panic!("expected item list");
        }
    }

    #[test]
    fn test_in_list() {
        let plan = parse("SELECT * FROM t WHERE id IN (1, 2, 3)").unwrap();
        assert!(matches!(plan.filter, Some(Expr::In { negated: false, .. })));
    }

    #[test]
    fn test_not_in_list() {
        let plan = parse("SELECT * FROM t WHERE id NOT IN (1, 2, 3)").unwrap();
        assert!(matches!(plan.filter, Some(Expr::In { negated: true, .. })));
    }

    #[test]
    fn test_is_null_and_is_not_null() {
        let plan = parse("SELECT * FROM t WHERE a IS NULL AND b IS NOT NULL").unwrap();
        assert!(matches!(plan.filter, Some(Expr::Binary { .. })));
    }

    #[test]
    fn test_like_operator() {
        let plan = parse("SELECT * FROM t WHERE name LIKE 'A%'").unwrap();
        assert!(matches!(
            plan.filter,
            Some(Expr::Binary {
                op: BinaryOp::Like,
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_statement_is_a_parse_error() {
        assert!(parse("SELECT FROM").is_err());
    }

    #[test]
    fn test_missing_where_expression_is_a_parse_error() {
        assert!(parse("SELECT * FROM t WHERE").is_err());
    }
}
