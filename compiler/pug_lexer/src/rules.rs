//! Single-line rules: keywords, tags, shortcuts and code.

use pug_diagnostic::{ErrorCode, PugResult};
use pug_ir::{BlockMode, Position, TokenKind};
use pug_lexer_core::{scan, scan_until, ScanOptions};
use regex::Regex;

use crate::patterns::{
    APPEND, ATTRIBUTE_LIKE, BLANK, BLOCK, CALL, CALL_ARGUMENTS, CASE, CLASS, CLASS_WITHOUT_LETTER,
    CODE, COLON, COMMENT, DOCTYPE, EACH, EACH_DASHED, EACH_OF, EACH_OF_DASHED, EACH_OF_IDENT,
    EACH_OF_PAIR, FILTER, ID, MIXIN, NON_SPACE, PATH, PREPEND, TAG, WHEN, WHEN_CONTINUATION,
    WHILE,
};
use crate::{starts_with_word, width, Lexer};

/// Conditional keywords, longest alternative of a shared prefix last.
const CONDITIONALS: [&str; 4] = ["if", "unless", "else if", "else"];

impl Lexer {
    /// Match `re` and consume it. The position moves past everything but
    /// the first capture group; returns the start position and that group.
    fn scan_with(&mut self, re: &Regex) -> Option<(Position, String)> {
        let caps = re.captures(self.rest())?;
        let len = caps[0].len();
        let val = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let skipped = width(&caps[0]) - width(&val);
        let start = self.position();
        self.consume(len);
        self.advance_column(skipped);
        Some((start, val))
    }

    /// Accept a match of `len` bytes only if the line ends after it (or a
    /// `:` block expansion follows). Consumes it along with trailing blanks
    /// and returns the token start, which skips leading spaces.
    fn end_of_line(&mut self, len: usize) -> Option<Position> {
        let rest = self.rest();
        let (matched, after) = rest.split_at(len);
        let leading = matched.len() - matched.trim_start_matches(' ').len();
        let consumed = if after.starts_with(':') {
            len
        } else {
            let trailing = after.len() - after.trim_start_matches([' ', '\t']).len();
            let tail = &after[trailing..];
            if !(tail.is_empty() || tail.starts_with('\n')) {
                return None;
            }
            len + trailing
        };
        let total = width(matched);
        self.advance_column(leading);
        let start = self.position();
        self.advance_column(total - leading);
        self.consume(consumed);
        Some(start)
    }

    /// A bare keyword that must end its line.
    fn keyword_line(&mut self, word: &str, kind: TokenKind) -> bool {
        if !self.rest().starts_with(word) {
            return false;
        }
        match self.end_of_line(word.len()) {
            Some(start) => {
                self.push(kind, start);
                true
            }
            None => false,
        }
    }

    /// Report `message` if the input starts with the keyword `word` in a
    /// form no rule accepted. The position moves past the keyword.
    fn misused_keyword(&mut self, word: &str, code: ErrorCode, message: &str) -> PugResult<bool> {
        if starts_with_word(self.rest(), word) {
            self.advance_column(word.len());
            return Err(self.error(code, message));
        }
        Ok(false)
    }

    /// Validate `src`, which ends at the current position.
    fn assert_expression_before(&mut self, src: &str) -> PugResult<()> {
        let w = width(src);
        self.retreat_column(w);
        self.assert_expression(src)?;
        self.advance_column(w);
        Ok(())
    }

    pub(crate) fn blank(&mut self) -> PugResult<bool> {
        let Some(m) = BLANK.find(self.rest()) else {
            return Ok(false);
        };
        let len = m.len();
        self.consume(len - 1);
        self.next_line(1);
        Ok(true)
    }

    pub(crate) fn eos(&mut self) -> PugResult<bool> {
        if !self.rest().is_empty() {
            return Ok(false);
        }
        if self.frame.interpolated {
            return Err(self.error(
                ErrorCode::NoEndBracket,
                "End of line was reached with no closing bracket for interpolation.",
            ));
        }
        for _ in 0..self.frame.open_levels() {
            let start = self.position();
            self.push(TokenKind::Outdent, start);
        }
        let start = self.position();
        self.push(TokenKind::Eos, start);
        self.frame.ended = true;
        Ok(true)
    }

    pub(crate) fn end_interpolation(&mut self) -> PugResult<bool> {
        if self.frame.interpolated && self.rest().starts_with(']') {
            self.consume(1);
            self.frame.ended = true;
            return Ok(true);
        }
        Ok(false)
    }

    pub(crate) fn yield_(&mut self) -> PugResult<bool> {
        Ok(self.keyword_line("yield", TokenKind::Yield))
    }

    pub(crate) fn doctype(&mut self) -> PugResult<bool> {
        let Some(caps) = DOCTYPE.captures(self.rest()) else {
            return Ok(false);
        };
        let len = caps[0].len();
        let val = caps[1].to_string();
        match self.end_of_line(len) {
            Some(start) => {
                self.push(TokenKind::Doctype(val), start);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// `#{expr}` in tag position.
    pub(crate) fn interpolation(&mut self) -> PugResult<bool> {
        if !self.rest().starts_with("#{") {
            return Ok(false);
        }
        let (end, src) = self.bracket_expression(1)?;
        self.consume(end + 1);
        let start = self.position();
        self.advance_column(2);
        self.assert_expression(&src)?;
        let lines = src.matches('\n').count();
        let last = src.rsplit('\n').next().unwrap_or("");
        self.next_line(lines);
        self.advance_column(width(last) + 1);
        self.push(TokenKind::Interpolation(src), start);
        Ok(true)
    }

    pub(crate) fn case(&mut self) -> PugResult<bool> {
        if let Some(caps) = CASE.captures(self.rest()) {
            let len = caps[0].len();
            let val = caps[1].to_string();
            if let Some(start) = self.end_of_line(len) {
                self.assert_expression_before(&val)?;
                self.push(TokenKind::Case(val), start);
                return Ok(true);
            }
        }
        self.misused_keyword("case", ErrorCode::NoCaseExpression, "missing expression for case")
    }

    pub(crate) fn when(&mut self) -> PugResult<bool> {
        if let Some(caps) = WHEN.captures(self.rest()) {
            let len = caps[0].len();
            let mut val = caps[1].to_string();
            if let Some(start) = self.end_of_line(len) {
                // A `:` inside a string or bracket does not end the expression.
                while scan(&val, None).is_ok_and(|state| state.is_nesting() || state.is_string()) {
                    let Some(more) = WHEN_CONTINUATION.find(self.rest()) else {
                        break;
                    };
                    let more = more.as_str().to_string();
                    val.push_str(&more);
                    self.consume(more.len());
                    self.advance_column(width(&more));
                }
                self.assert_expression_before(&val)?;
                self.push(TokenKind::When(val), start);
                return Ok(true);
            }
        }
        self.misused_keyword("when", ErrorCode::NoWhenExpression, "missing expression for when")
    }

    pub(crate) fn default_branch(&mut self) -> PugResult<bool> {
        if self.keyword_line("default", TokenKind::Default) {
            return Ok(true);
        }
        self.misused_keyword(
            "default",
            ErrorCode::DefaultWithExpression,
            "default should not have an expression",
        )
    }

    pub(crate) fn extends(&mut self) -> PugResult<bool> {
        let rest = self.rest();
        let word = ["extends", "extend"].into_iter().find(|word| {
            rest.strip_prefix(word)
                .is_some_and(|after| after.is_empty() || after.starts_with([' ', '\n']))
        });
        if let Some(word) = word {
            let start = self.position();
            self.consume(word.len());
            self.advance_column(word.len());
            self.push(TokenKind::Extends, start);
            if !self.path()? {
                return Err(self.error(ErrorCode::NoExtendsPath, "missing path for extends"));
            }
            return Ok(true);
        }
        let word = if self.rest().starts_with("extends") { "extends" } else { "extend" };
        self.misused_keyword(word, ErrorCode::MalformedExtends, "malformed extends")
    }

    pub(crate) fn append(&mut self) -> PugResult<bool> {
        self.named_block(&APPEND, BlockMode::Append)
    }

    pub(crate) fn prepend(&mut self) -> PugResult<bool> {
        self.named_block(&PREPEND, BlockMode::Prepend)
    }

    pub(crate) fn block(&mut self) -> PugResult<bool> {
        self.named_block(&BLOCK, BlockMode::Replace)
    }

    /// `block name`, `append name` or `prepend name`. A `//` comment after
    /// the name is left in the input.
    fn named_block(&mut self, re: &Regex, mode: BlockMode) -> PugResult<bool> {
        let Some(caps) = re.captures(self.rest()) else {
            return Ok(false);
        };
        let whole = caps[0].to_string();
        let name_start = caps.get(1).map_or(0, |m| m.start());
        let cut = whole[name_start..]
            .find("//")
            .map_or(whole.len(), |i| name_start + i);
        let name = whole[name_start..cut].trim().to_string();
        if name.is_empty() {
            return Ok(false);
        }
        let len = whole[..cut].trim_end_matches([' ', '\t', '\n']).len();
        let start = self.position();
        self.advance_column(width(&whole[..len]));
        self.push(TokenKind::Block { name, mode }, start);
        self.consume(cut);
        self.advance_column(width(&whole[len..cut]));
        Ok(true)
    }

    /// `block` alone inside a mixin.
    pub(crate) fn mixin_block(&mut self) -> PugResult<bool> {
        Ok(self.keyword_line("block", TokenKind::MixinBlock))
    }

    pub(crate) fn include(&mut self) -> PugResult<bool> {
        let is_include = self.rest().strip_prefix("include").is_some_and(|after| {
            after.is_empty() || after.starts_with([':', ' ', '\n'])
        });
        if !is_include {
            return self.misused_keyword("include", ErrorCode::MalformedInclude, "malformed include");
        }
        let start = self.position();
        self.consume(7);
        self.advance_column(7);
        self.push(TokenKind::Include, start);
        while self.filter(true)? {}
        if !self.path()? {
            if NON_SPACE.is_match(self.rest()) {
                return Err(self.fail());
            }
            return Err(self.error(ErrorCode::NoIncludePath, "missing path for include"));
        }
        Ok(true)
    }

    /// The path after `extends` or `include`.
    fn path(&mut self) -> PugResult<bool> {
        let Some(caps) = PATH.captures(self.rest()) else {
            return Ok(false);
        };
        let len = caps[0].len();
        let val = caps[1].trim().to_string();
        let Some(start) = self.end_of_line(len) else {
            return Ok(false);
        };
        if val.is_empty() {
            return Ok(false);
        }
        self.push(TokenKind::Path(val), start);
        Ok(true)
    }

    pub(crate) fn mixin(&mut self) -> PugResult<bool> {
        let Some(caps) = MIXIN.captures(self.rest()) else {
            return Ok(false);
        };
        let len = caps[0].len();
        let total = width(&caps[0]);
        let name = caps[1].to_string();
        let args = caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .filter(|args| !args.is_empty());
        self.consume(len);
        let start = self.position();
        self.advance_column(total);
        self.push(TokenKind::Mixin { name, args }, start);
        Ok(true)
    }

    /// `+name(args)` or `+#{expr}(args)`.
    pub(crate) fn call(&mut self) -> PugResult<bool> {
        let Some(caps) = CALL.captures(self.rest()) else {
            return Ok(false);
        };
        let spaces = caps[1].len();
        let simple = caps.get(2).map(|m| m.as_str().to_string());
        let matched = caps[0].len();
        let matched_width = width(&caps[0]);

        let (name, increment) = match simple {
            Some(name) => {
                self.consume(matched);
                (name, matched_width)
            }
            None => {
                let (end, src) = self.bracket_expression(2 + spaces)?;
                let increment = width(&self.rest()[..=end]);
                self.consume(end + 1);
                self.assert_expression(&src)?;
                (format!("#{{{src}}}"), increment)
            }
        };
        let start = self.position();
        self.advance_column(increment);

        let mut args = None;
        if let Some(open) = CALL_ARGUMENTS.find(self.rest()) {
            let skip = open.len() - 1;
            let (end, src) = self.bracket_expression(skip)?;
            if !ATTRIBUTE_LIKE.is_match(&src) {
                self.advance_column(1);
                self.consume(end + 1);
                self.assert_expression(&format!("[{src}]"))?;
                self.step_over(&src);
                self.advance_column(1);
                args = Some(src);
            }
        }
        self.push(TokenKind::Call { name, args }, start);
        Ok(true)
    }

    /// `if`, `unless`, `else if` and `else`.
    pub(crate) fn conditional(&mut self) -> PugResult<bool> {
        let rest = self.rest();
        let Some(word) = CONDITIONALS.into_iter().find(|word| starts_with_word(rest, word)) else {
            return Ok(false);
        };
        let line_end = rest.find('\n').unwrap_or(rest.len());
        let whole_width = width(&rest[..line_end]);
        let js = rest[word.len()..line_end].trim().to_string();
        self.consume(line_end);
        let start = self.position();
        self.advance_column(whole_width - width(&js));

        let kind = match word {
            "if" => {
                self.assert_expression(&js)?;
                TokenKind::If(js.clone())
            }
            "else if" => {
                self.assert_expression(&js)?;
                TokenKind::ElseIf(js.clone())
            }
            "unless" => {
                self.assert_expression(&js)?;
                TokenKind::If(format!("!({js})"))
            }
            _ => {
                if !js.is_empty() {
                    return Err(self.error(
                        ErrorCode::ElseCondition,
                        "`else` cannot have a condition, perhaps you meant `else if`",
                    ));
                }
                TokenKind::Else
            }
        };
        self.advance_column(width(&js));
        self.push(kind, start);
        Ok(true)
    }

    pub(crate) fn while_(&mut self) -> PugResult<bool> {
        if let Some(caps) = WHILE.captures(self.rest()) {
            let len = caps[0].len();
            let total = width(&caps[0]);
            let test = caps[1].to_string();
            self.consume(len);
            self.assert_expression(&test)?;
            let start = self.position();
            self.advance_column(total);
            self.push(TokenKind::While(test), start);
            return Ok(true);
        }
        self.misused_keyword("while", ErrorCode::NoWhileExpression, "missing expression for while")
    }

    /// `each value, key in expr`.
    pub(crate) fn each(&mut self) -> PugResult<bool> {
        if let Some(caps) = EACH.captures(self.rest()) {
            let len = caps[0].len();
            let total = width(&caps[0]);
            let val = caps[1].to_string();
            let key = caps.get(2).map(|m| m.as_str().to_string());
            let code = caps[3].to_string();
            self.consume(len);
            let start = self.position();
            self.advance_column(total - width(&code));
            self.assert_expression(&code)?;
            self.advance_column(width(&code));
            self.push(TokenKind::Each { val, key, code }, start);
            return Ok(true);
        }
        let rest = self.rest();
        let keyword = ["each", "for"]
            .into_iter()
            .find(|word| starts_with_word(rest, word));
        if let Some(name) = keyword {
            self.advance_column(name.len());
            return Err(self.error(
                ErrorCode::MalformedEach,
                format!(
                    "This `{name}` has a syntax error. `{name}` statements should be of the form: `{name} VARIABLE_NAME of JS_EXPRESSION`"
                ),
            ));
        }
        if EACH_DASHED.is_match(rest) {
            return Err(self.error(
                ErrorCode::MalformedEach,
                "Pug each and for should no longer be prefixed with a dash (\"-\"). They are pug keywords and not part of JavaScript.",
            ));
        }
        Ok(false)
    }

    /// `each value of expr`, where the value is an identifier or a
    /// `[key, value]` pair.
    pub(crate) fn each_of(&mut self) -> PugResult<bool> {
        if let Some(caps) = EACH_OF.captures(self.rest()) {
            let len = caps[0].len();
            let total = width(&caps[0]);
            let val = caps[1].to_string();
            let code = caps[2].to_string();
            self.consume(len);
            let start = self.position();
            self.advance_column(total - width(&code));
            self.assert_expression(&code)?;
            self.advance_column(width(&code));
            let binding = val.trim();
            let valid = EACH_OF_IDENT.is_match(binding) || EACH_OF_PAIR.is_match(binding);
            self.push(TokenKind::EachOf { val, code }, start);
            if !valid {
                return Err(self.error(
                    ErrorCode::MalformedEachOfLval,
                    "The value variable for each must either be a valid identifier (e.g. `item`) or a pair of identifiers in square brackets (e.g. `[key, value]`).",
                ));
            }
            return Ok(true);
        }
        if EACH_OF_DASHED.is_match(self.rest()) {
            return Err(self.error(
                ErrorCode::MalformedEach,
                "Pug each and for should not be prefixed with a dash (\"-\"). They are pug keywords and not part of JavaScript.",
            ));
        }
        Ok(false)
    }

    pub(crate) fn tag(&mut self) -> PugResult<bool> {
        let Some(m) = TAG.find(self.rest()) else {
            return Ok(false);
        };
        let name = m.as_str().to_string();
        self.consume(name.len());
        let start = self.position();
        self.advance_column(width(&name));
        self.push(TokenKind::Tag(name), start);
        Ok(true)
    }

    pub(crate) fn top_level_filter(&mut self) -> PugResult<bool> {
        self.filter(false)
    }

    /// `:name(attrs)`. Outside an `include` the filter body follows as
    /// pipeless text.
    fn filter(&mut self, in_include: bool) -> PugResult<bool> {
        let Some((start, name)) = self.scan_with(&FILTER) else {
            return Ok(false);
        };
        self.advance_column(width(&name));
        self.push(TokenKind::Filter(name), start);
        self.attrs()?;
        if !in_include {
            self.frame.interpolation_allowed = false;
            self.pipeless_text(None)?;
        }
        Ok(true)
    }

    /// `-` alone on a line, opening a block of unbuffered code.
    pub(crate) fn block_code(&mut self) -> PugResult<bool> {
        if !self.keyword_line("-", TokenKind::BlockCode) {
            return Ok(false);
        }
        self.frame.interpolation_allowed = false;
        self.pipeless_text(None)?;
        Ok(true)
    }

    /// `= expr`, `!= expr` or `- statement`.
    pub(crate) fn code(&mut self) -> PugResult<bool> {
        let Some(caps) = CODE.captures(self.rest()) else {
            return Ok(false);
        };
        let matched = caps[0].len();
        let matched_width = width(&caps[0]);
        let flags = caps[1].to_string();
        let full = caps[2].to_string();

        let mut code = full.clone();
        let mut shortened = 0;
        if self.frame.interpolated {
            match scan_until(&full, ']', ScanOptions::default()) {
                Ok(section) => {
                    shortened = full.len() - section.end;
                    code = section.src.to_string();
                }
                Err(err) => {
                    let upto = width(&full[..err.index().min(full.len())]);
                    self.advance_column(matched_width - width(&full) + upto);
                    return Err(self.scan_error(
                        &err,
                        "End of line was reached with no closing bracket for interpolation."
                            .to_string(),
                    ));
                }
            }
        }
        self.consume(matched - shortened);
        let start = self.position();
        let must_escape = flags.starts_with('=');
        let buffer = flags != "-";
        self.advance_column(matched_width - width(&full));
        if buffer {
            self.assert_expression(&code)?;
        }
        self.advance_column(width(&code));
        self.push(
            TokenKind::Code {
                val: code,
                must_escape,
                buffer,
            },
            start,
        );
        Ok(true)
    }

    pub(crate) fn id(&mut self) -> PugResult<bool> {
        if let Some((start, name)) = self.scan_with(&ID) {
            self.advance_column(width(&name));
            self.push(TokenKind::Id(name), start);
            return Ok(true);
        }
        if let Some(after) = self.rest().strip_prefix('#') {
            let name = invalid_name(after);
            return Err(self.error(ErrorCode::InvalidId, format!("\"{name}\" is not a valid ID.")));
        }
        Ok(false)
    }

    /// `.` at the end of a tag: the block below is plain text.
    pub(crate) fn dot(&mut self) -> PugResult<bool> {
        if !self.keyword_line(".", TokenKind::Dot) {
            return Ok(false);
        }
        self.pipeless_text(None)?;
        Ok(true)
    }

    pub(crate) fn class_name(&mut self) -> PugResult<bool> {
        if let Some((start, name)) = self.scan_with(&CLASS) {
            self.advance_column(width(&name));
            self.push(TokenKind::Class(name), start);
            return Ok(true);
        }
        if CLASS_WITHOUT_LETTER.is_match(self.rest()) {
            return Err(self.error(
                ErrorCode::InvalidClassName,
                "Class names must contain at least one letter or underscore.",
            ));
        }
        if let Some(after) = self.rest().strip_prefix('.') {
            let name = invalid_name(after);
            return Err(self.error(
                ErrorCode::InvalidClassName,
                format!(
                    "\"{name}\" is not a valid class name.  Class names can only contain \"_\", \"-\", a-z and 0-9, and must contain at least one of \"_\", or a-z"
                ),
            ));
        }
        Ok(false)
    }

    /// `&attributes(expr)`.
    pub(crate) fn attributes_block(&mut self) -> PugResult<bool> {
        const KEYWORD: &str = "&attributes";
        if !starts_with_word(self.rest(), KEYWORD) {
            return Ok(false);
        }
        self.consume(KEYWORD.len());
        let start = self.position();
        self.advance_column(KEYWORD.len());
        let (end, src) = self.bracket_expression(0)?;
        let consumed = width(&self.rest()[..=end]);
        self.consume(end + 1);
        self.advance_column(consumed);
        self.push(TokenKind::AttributeBlock(src), start);
        Ok(true)
    }

    pub(crate) fn comment(&mut self) -> PugResult<bool> {
        let Some(caps) = COMMENT.captures(self.rest()) else {
            return Ok(false);
        };
        let len = caps[0].len();
        let total = width(&caps[0]);
        let buffer = caps.get(1).is_none();
        let val = caps[2].to_string();
        self.consume(len);
        let start = self.position();
        self.frame.interpolation_allowed = buffer;
        self.advance_column(total);
        self.push(TokenKind::Comment { val, buffer }, start);
        self.pipeless_text(None)?;
        Ok(true)
    }

    pub(crate) fn slash(&mut self) -> PugResult<bool> {
        if !self.rest().starts_with('/') {
            return Ok(false);
        }
        let start = self.position();
        self.consume(1);
        self.advance_column(1);
        self.push(TokenKind::Slash, start);
        Ok(true)
    }

    /// `: ` block expansion.
    pub(crate) fn colon(&mut self) -> PugResult<bool> {
        let Some((start, _)) = self.scan_with(&COLON) else {
            return Ok(false);
        };
        self.push(TokenKind::Colon, start);
        Ok(true)
    }
}

/// The word after an invalid `#` or `.` shortcut, for the error message.
fn invalid_name(after: &str) -> String {
    let after = after.trim_start_matches('\n');
    let mut chars = after.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut name = first.to_string();
    name.extend(chars.take_while(|c| !matches!(c, ' ' | '\t' | '(' | '#' | '.' | ':' | '\n')));
    name
}
