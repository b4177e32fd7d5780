//! Parameter lists for `def`, `async def` and `lambda`.
//!
//! The two styles differ only in their closing token (`)` vs `:`) and in
//! what 3.x allows annotations on. 2.x sublist parameters
//! (`def f((a, b)):`) parse as a target expression; 3.x keyword-only
//! parameters appear after a `*` or bare-`*` marker. The list is parsed
//! up to but not including the terminator, which the caller expects.

use pylon_ir::{ExprId, Name, Param, ParamKind, ParamRange, Span, TokenTag};

use crate::Parser;

/// Which construct owns the parameter list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ParamStyle {
    Function,
    Lambda,
}

impl ParamStyle {
    fn terminator(self) -> TokenTag {
        match self {
            ParamStyle::Function => TokenTag::RParen,
            ParamStyle::Lambda => TokenTag::Colon,
        }
    }
}

impl Parser<'_> {
    pub(crate) fn parse_param_list(&mut self, style: ParamStyle) -> ParamRange {
        let terminator = style.terminator();
        let mut params: Vec<Param> = Vec::new();
        let mut seen: Vec<Name> = Vec::new();
        let mut saw_default = false;
        let mut saw_star = false;
        loop {
            if self.at(terminator) {
                break;
            }
            let start = self.span();
            if self.eat(TokenTag::StarStar) {
                let name = self.parse_param_name(&mut seen);
                let annotation = self.parse_param_annotation(style);
                params.push(Param {
                    name,
                    kind: ParamKind::DoubleStar,
                    default: None,
                    annotation,
                    sublist: None,
                    span: Span::new(start.start, self.last_end()),
                });
            } else if self.eat(TokenTag::Star) {
                if self.at(TokenTag::Comma) || self.at(terminator) {
                    // Bare '*': keyword-only marker, 3.x only.
                    if !self.version().is_3x() {
                        self.syntax_error(start, "invalid syntax");
                    }
                    saw_star = true;
                } else {
                    let name = self.parse_param_name(&mut seen);
                    let annotation = self.parse_param_annotation(style);
                    params.push(Param {
                        name,
                        kind: ParamKind::Star,
                        default: None,
                        annotation,
                        sublist: None,
                        span: Span::new(start.start, self.last_end()),
                    });
                    saw_star = true;
                }
            } else if self.at(TokenTag::LParen) && !self.version().is_3x() {
                // 2.x tuple-unpacking parameter.
                let sublist = self.parse_atom();
                self.check_assign_target(sublist);
                let default = if self.eat(TokenTag::Assign) {
                    saw_default = true;
                    Some(self.parse_test())
                } else {
                    if saw_default {
                        self.syntax_error(
                            start,
                            "non-default argument follows default argument",
                        );
                    }
                    None
                };
                params.push(Param {
                    name: None,
                    kind: ParamKind::Sublist,
                    default,
                    annotation: None,
                    sublist: Some(sublist),
                    span: Span::new(start.start, self.last_end()),
                });
            } else {
                let name = self.parse_param_name(&mut seen);
                let kind = if saw_star {
                    if self.version().is_3x() {
                        ParamKind::KeywordOnly
                    } else {
                        self.syntax_error(start, "invalid syntax");
                        ParamKind::Normal
                    }
                } else {
                    ParamKind::Normal
                };
                let annotation = self.parse_param_annotation(style);
                let default = if self.eat(TokenTag::Assign) {
                    saw_default = true;
                    Some(self.parse_test())
                } else {
                    // Keyword-only parameters may follow one with a
                    // default; positional ones may not.
                    if saw_default && kind == ParamKind::Normal {
                        self.syntax_error(
                            start,
                            "non-default argument follows default argument",
                        );
                    }
                    None
                };
                params.push(Param {
                    name,
                    kind,
                    default,
                    annotation,
                    sublist: None,
                    span: Span::new(start.start, self.last_end()),
                });
            }
            if !self.eat(TokenTag::Comma) {
                break;
            }
        }
        self.arena.alloc_params(params)
    }

    /// `: annotation` after a parameter name, `def` style in 3.x only.
    fn parse_param_annotation(&mut self, style: ParamStyle) -> Option<ExprId> {
        if style != ParamStyle::Function || !self.version().is_3x() {
            return None;
        }
        if !self.eat(TokenTag::Colon) {
            return None;
        }
        Some(self.parse_test())
    }

    fn parse_param_name(&mut self, seen: &mut Vec<Name>) -> Option<Name> {
        let span = self.span();
        let name = self.parse_raw_name()?;
        if seen.contains(&name) {
            let message = format!(
                "duplicate argument '{}' in function definition",
                self.lookup(name)
            );
            self.syntax_error(span, message);
        } else {
            seen.push(name);
        }
        Some(name)
    }
}
