//! Parser for the schematic description language.

use std::collections::HashMap;

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::circuit::Point;
use crate::components::ComponentKind;
use crate::error::{Result, SimulationError};

/// Parser for schematic descriptions.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire schematic description.
    pub fn parse(&mut self) -> Result<SchematicAst> {
        let mut ast = SchematicAst::new();

        while self.current.kind != TokenKind::Eof {
            match &self.current.kind {
                TokenKind::Newline => {
                    self.advance()?;
                    continue;
                }
                TokenKind::Directive => {
                    self.parse_directive(&mut ast)?;
                }
                TokenKind::Identifier => {
                    let component = self.parse_component()?;
                    ast.components.push(component);
                }
                _ => {
                    return Err(SimulationError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            match self.current.kind {
                TokenKind::Newline => self.advance()?,
                TokenKind::Eof => {}
                _ => {
                    return Err(SimulationError::parse(
                        self.current.line,
                        format!("unexpected trailing token: {:?}", self.current.text),
                    ));
                }
            }
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(SimulationError::parse(
                self.current.line,
                format!("expected {:?}, got {:?}", kind, self.current.kind),
            ))
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof)
    }

    fn parse_directive(&mut self, ast: &mut SchematicAst) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".wire" => {
                let mut points = Vec::new();
                while !self.at_line_end() {
                    let first = self.expect(TokenKind::Number)?;
                    points.push(self.parse_point(&first)?);
                }
                if points.len() < 2 {
                    return Err(SimulationError::parse(line, "a wire needs at least two points"));
                }
                ast.wires.push(WireDef { points, line });
            }
            ".model" => {
                let model = self.parse_model_def(line)?;
                if ast.models.contains_key(&model.name) {
                    return Err(SimulationError::DuplicateModel { name: model.name });
                }
                ast.models.insert(model.name.clone(), model);
            }
            _ => {
                return Err(SimulationError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }

    /// Parse the `,y` tail of a point whose x coordinate is `first`.
    fn parse_point(&mut self, first: &Token) -> Result<Point> {
        let line = first.line;
        let x = parse_coordinate(first)?;
        self.expect(TokenKind::Comma)?;
        let second = self.expect(TokenKind::Number)?;
        let y = parse_coordinate(&second)?;
        if second.line != line {
            return Err(SimulationError::parse(line, "point split across lines"));
        }
        Ok(Point::new(x, y))
    }

    fn parse_model_def(&mut self, line: usize) -> Result<ModelDef> {
        let name = self.expect(TokenKind::Identifier)?.text;
        let type_str = self.expect(TokenKind::Identifier)?.text;

        if !matches!(type_str.to_ascii_uppercase().as_str(), "OP" | "OPAMP") {
            return Err(SimulationError::parse(line, format!("unknown model type: {}", type_str)));
        }

        let mut params = HashMap::new();

        // Parse parameters in parentheses: (param=value param2=value2)
        if self.current.kind == TokenKind::OpenParen {
            self.advance()?;

            while self.current.kind != TokenKind::CloseParen && !self.at_line_end() {
                let param_name = self.expect(TokenKind::Identifier)?.text;
                self.expect(TokenKind::Equals)?;
                let value = self.parse_number_value(line)?;
                params.insert(param_name.to_lowercase(), value);
            }

            self.expect(TokenKind::CloseParen)?;
        }

        Ok(ModelDef { name, params, line })
    }

    fn parse_number_value(&mut self, line: usize) -> Result<f64> {
        if self.current.kind != TokenKind::Number {
            return Err(SimulationError::parse(line, "expected numeric value"));
        }
        let text = self.current.text.clone();
        self.advance()?;
        parse_value(&text).ok_or_else(|| SimulationError::parse(line, format!("invalid number: {}", text)))
    }

    fn parse_component(&mut self) -> Result<ComponentDef> {
        let first_token = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        // Keywords first, so that e.g. GROUND isn't taken for a name prefix
        let (kind, name) = if let Some(kind) = ComponentKind::from_keyword(&first_token) {
            let actual_name = self.expect(TokenKind::Identifier)?.text;
            (kind, actual_name)
        } else {
            let upper = first_token.to_uppercase();
            if upper.starts_with("OP") {
                (ComponentKind::OpAmp, first_token)
            } else if upper.starts_with("GND") {
                (ComponentKind::Ground, first_token)
            } else {
                let first_char = first_token.chars().next().unwrap_or('?');
                let kind = ComponentKind::from_prefix(first_char).ok_or_else(|| {
                    SimulationError::UnknownComponentType {
                        component_type: first_token.clone(),
                        line,
                    }
                })?;
                (kind, first_token)
            }
        };

        let mut points = Vec::with_capacity(kind.terminal_count());
        let mut value = None;
        let mut model_ref = None;
        let mut params = HashMap::new();

        // Points, value, source keywords and parameters until end of line
        while !self.at_line_end() {
            match self.current.kind {
                TokenKind::Number => {
                    let tok = self.current.clone();
                    self.advance()?;

                    if self.current.kind == TokenKind::Comma {
                        points.push(self.parse_point(&tok)?);
                    } else if value.is_none() {
                        value = Some(parse_value(&tok.text).ok_or_else(|| {
                            SimulationError::invalid_component(&name, line, format!("invalid value: {}", tok.text))
                        })?);
                    } else {
                        return Err(SimulationError::invalid_component(
                            &name,
                            line,
                            format!("unexpected extra value: {}", tok.text),
                        ));
                    }
                }
                TokenKind::Identifier => {
                    let text = self.current.text.clone();
                    self.advance()?;

                    if self.current.kind == TokenKind::Equals {
                        // param=value
                        self.advance()?;
                        let v = self.parse_number_value(line)?;
                        params.insert(text.to_lowercase(), v);
                    } else if text.eq_ignore_ascii_case("DC") || text.eq_ignore_ascii_case("AC") {
                        // Source type keyword, followed by the output value
                        params.insert(text.to_lowercase(), 1.0);
                        value = Some(self.parse_number_value(line)?);
                    } else if model_ref.is_none() {
                        model_ref = Some(text);
                    } else {
                        return Err(SimulationError::invalid_component(
                            &name,
                            line,
                            format!("unexpected token: {}", text),
                        ));
                    }
                }
                _ => {
                    return Err(SimulationError::parse(
                        line,
                        format!("unexpected token in component '{}': {:?}", name, self.current.text),
                    ));
                }
            }
        }

        if points.len() != kind.terminal_count() {
            return Err(SimulationError::invalid_component(
                &name,
                line,
                format!("expected {} terminals, got {}", kind.terminal_count(), points.len()),
            ));
        }

        Ok(ComponentDef {
            kind,
            name,
            points,
            value,
            model_ref,
            params,
            line,
        })
    }
}

fn parse_coordinate(tok: &Token) -> Result<i32> {
    tok.text
        .parse::<i32>()
        .map_err(|_| SimulationError::parse(tok.line, format!("invalid grid coordinate: {}", tok.text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resistor() {
        let ast = super::super::parse("R1 0,0 0,4 10k").unwrap();
        assert_eq!(ast.components.len(), 1);
        let r = &ast.components[0];
        assert_eq!(r.kind, ComponentKind::Resistor);
        assert_eq!(r.name, "R1");
        assert_eq!(r.points, vec![Point::new(0, 0), Point::new(0, 4)]);
        assert_eq!(r.value, Some(10_000.0));
    }

    #[test]
    fn test_parse_sources() {
        let input = "V1 0,4 0,0 DC 5\nV2 2,4 2,0 AC 1 freq=1k\nI1 3,4 3,0 1m";
        let ast = super::super::parse(input).unwrap();
        assert_eq!(ast.components.len(), 3);

        let v1 = &ast.components[0];
        assert_eq!(v1.kind, ComponentKind::VoltageSource);
        assert_eq!(v1.value, Some(5.0));
        assert!(v1.params.contains_key("dc"));

        let v2 = &ast.components[1];
        assert!(v2.params.contains_key("ac"));
        assert_eq!(v2.params["freq"], 1000.0);

        let i1 = &ast.components[2];
        assert_eq!(i1.kind, ComponentKind::CurrentSource);
        assert_eq!(i1.value, Some(1e-3));
    }

    #[test]
    fn test_parse_op_amp_and_ground() {
        let input = "OP1 0,0 0,2 4,1 FAST\nGND1 0,-2\nGROUND G2 5,5";
        let ast = super::super::parse(input).unwrap();
        assert_eq!(ast.components[0].kind, ComponentKind::OpAmp);
        assert_eq!(ast.components[0].model_ref.as_deref(), Some("FAST"));
        assert_eq!(ast.components[1].kind, ComponentKind::Ground);
        assert_eq!(ast.components[1].points, vec![Point::new(0, -2)]);
        assert_eq!(ast.components[2].kind, ComponentKind::Ground);
        assert_eq!(ast.components[2].name, "G2");
    }

    #[test]
    fn test_parse_wire_and_model() {
        let input = ".model FAST OPAMP (gain=1e5 vpos=12 vneg=-12)\n.wire 0,4 4,4 4,0\n";
        let ast = super::super::parse(input).unwrap();
        assert_eq!(ast.wires.len(), 1);
        assert_eq!(
            ast.wires[0].points,
            vec![Point::new(0, 4), Point::new(4, 4), Point::new(4, 0)]
        );
        let model = &ast.models["FAST"];
        assert_eq!(model.params["gain"], 1e5);
        assert_eq!(model.params["vneg"], -12.0);
    }

    #[test]
    fn test_parse_with_comments() {
        let input = "# A comment\nR1 0,0 1,0 1k ; inline comment\n\n";
        let ast = super::super::parse(input).unwrap();
        assert_eq!(ast.components.len(), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            super::super::parse("X1 0,0 1,0"),
            Err(SimulationError::UnknownComponentType { .. })
        ));
        assert!(matches!(
            super::super::parse("R1 0,0 1k"),
            Err(SimulationError::InvalidComponent { .. })
        ));
        assert!(super::super::parse(".wire 0,0").is_err());
        assert!(super::super::parse("R1 0.5,0 1,0 1k").is_err());
        assert!(matches!(
            super::super::parse(".model A OPAMP (gain=1)\n.model A OPAMP (gain=2)"),
            Err(SimulationError::DuplicateModel { .. })
        ));
    }
}
