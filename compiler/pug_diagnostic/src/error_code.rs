use std::fmt;

/// Error codes for all compiler diagnostics, grouped by the stage that
/// raises them. Rendered as `PUG:NAME`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer
    /// Tabs and spaces mixed on one line
    InvalidIndentation,
    /// Dedent to a width that was never pushed
    InconsistentIndentation,
    /// End of input inside a bracketed expression
    NoEndBracket,
    /// Close bracket that does not match the open one
    BracketMismatch,
    /// Bracketed expression does not start with a bracket
    AssertFailed,
    /// Attribute list with unbalanced nesting
    IncorrectNesting,
    /// Invalid character in an attribute name
    InvalidKeyCharacter,
    /// Embedded expression does not parse
    SyntaxError,
    NoCaseExpression,
    NoWhenExpression,
    DefaultWithExpression,
    NoWhileExpression,
    NoExtendsPath,
    MalformedExtends,
    NoIncludePath,
    MalformedInclude,
    MalformedEach,
    MalformedEachOfLval,
    ElseCondition,
    InvalidId,
    InvalidClassName,
    /// Text no lexer rule recognises
    UnexpectedText,
    /// `#[...]` nested beyond the configured depth
    InterpolationTooDeep,

    // Comment stripping
    UnexpectedToken,

    // Parser
    /// Token where a different one was required
    InvalidToken,
    BlockInBufferedCode,
    /// Spelling kept for compatibility with existing tooling
    BlockOutsideMixin,
    MixinWithoutBody,
    RawIncludeBlock,
    DuplicateId,
    DuplicateAttribute,

    // Load and link
    /// Loader failed to resolve or read a file
    FileLoad,
    ExtendsNotFirst,
    UnexpectedNodesInExtendingRoot,
    /// Override of a block no ancestor declares
    UnexpectedBlock,

    // Filters
    UnknownFilter,
    /// Spelling kept for compatibility with existing tooling
    FilterAliasChain,
    FilterOptionNotConstant,
    FilterFailed,

    // Code generation
    SelfClosingContent,
    /// Node that an earlier pass should have removed
    UnprocessedNode,

    // Driver
    PluginConflict,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidIndentation => "INVALID_INDENTATION",
            ErrorCode::InconsistentIndentation => "INCONSISTENT_INDENTATION",
            ErrorCode::NoEndBracket => "NO_END_BRACKET",
            ErrorCode::BracketMismatch => "BRACKET_MISMATCH",
            ErrorCode::AssertFailed => "ASSERT_FAILED",
            ErrorCode::IncorrectNesting => "INCORRECT_NESTING",
            ErrorCode::InvalidKeyCharacter => "INVALID_KEY_CHARACTER",
            ErrorCode::SyntaxError => "SYNTAX_ERROR",
            ErrorCode::NoCaseExpression => "NO_CASE_EXPRESSION",
            ErrorCode::NoWhenExpression => "NO_WHEN_EXPRESSION",
            ErrorCode::DefaultWithExpression => "DEFAULT_WITH_EXPRESSION",
            ErrorCode::NoWhileExpression => "NO_WHILE_EXPRESSION",
            ErrorCode::NoExtendsPath => "NO_EXTENDS_PATH",
            ErrorCode::MalformedExtends => "MALFORMED_EXTENDS",
            ErrorCode::NoIncludePath => "NO_INCLUDE_PATH",
            ErrorCode::MalformedInclude => "MALFORMED_INCLUDE",
            ErrorCode::MalformedEach => "MALFORMED_EACH",
            ErrorCode::MalformedEachOfLval => "MALFORMED_EACH_OF_LVAL",
            ErrorCode::ElseCondition => "ELSE_CONDITION",
            ErrorCode::InvalidId => "INVALID_ID",
            ErrorCode::InvalidClassName => "INVALID_CLASS_NAME",
            ErrorCode::UnexpectedText => "UNEXPECTED_TEXT",
            ErrorCode::InterpolationTooDeep => "INTERPOLATION_TOO_DEEP",
            ErrorCode::UnexpectedToken => "UNEXPECTED_TOKEN",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::BlockInBufferedCode => "BLOCK_IN_BUFFERED_CODE",
            ErrorCode::BlockOutsideMixin => "BLOCK_OUTISDE_MIXIN",
            ErrorCode::MixinWithoutBody => "MIXIN_WITHOUT_BODY",
            ErrorCode::RawIncludeBlock => "RAW_INCLUDE_BLOCK",
            ErrorCode::DuplicateId => "DUPLICATE_ID",
            ErrorCode::DuplicateAttribute => "DUPLICATE_ATTRIBUTE",
            ErrorCode::FileLoad => "FILE_LOAD",
            ErrorCode::ExtendsNotFirst => "EXTENDS_NOT_FIRST",
            ErrorCode::UnexpectedNodesInExtendingRoot => "UNEXPECTED_NODES_IN_EXTENDING_ROOT",
            ErrorCode::UnexpectedBlock => "UNEXPECTED_BLOCK",
            ErrorCode::UnknownFilter => "UNKNOWN_FILTER",
            ErrorCode::FilterAliasChain => "FILTER_ALISE_CHAIN",
            ErrorCode::FilterOptionNotConstant => "FILTER_OPTION_NOT_CONSTANT",
            ErrorCode::FilterFailed => "FILTER_FAILED",
            ErrorCode::SelfClosingContent => "SELF_CLOSING_CONTENT",
            ErrorCode::UnprocessedNode => "UNPROCESSED_NODE",
            ErrorCode::PluginConflict => "PLUGIN_CONFLICT",
        }
    }

    /// Raised while turning source text into tokens.
    pub fn is_lexer_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::InvalidIndentation
                | ErrorCode::InconsistentIndentation
                | ErrorCode::NoEndBracket
                | ErrorCode::BracketMismatch
                | ErrorCode::AssertFailed
                | ErrorCode::IncorrectNesting
                | ErrorCode::InvalidKeyCharacter
                | ErrorCode::SyntaxError
                | ErrorCode::NoCaseExpression
                | ErrorCode::NoWhenExpression
                | ErrorCode::DefaultWithExpression
                | ErrorCode::NoWhileExpression
                | ErrorCode::NoExtendsPath
                | ErrorCode::MalformedExtends
                | ErrorCode::NoIncludePath
                | ErrorCode::MalformedInclude
                | ErrorCode::MalformedEach
                | ErrorCode::MalformedEachOfLval
                | ErrorCode::ElseCondition
                | ErrorCode::InvalidId
                | ErrorCode::InvalidClassName
                | ErrorCode::UnexpectedText
                | ErrorCode::InterpolationTooDeep
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PUG:{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_prefix() {
        assert_eq!(ErrorCode::UnexpectedBlock.to_string(), "PUG:UNEXPECTED_BLOCK");
        assert_eq!(ErrorCode::InvalidToken.as_str(), "INVALID_TOKEN");
    }

    #[test]
    fn historical_spellings_are_preserved() {
        assert_eq!(ErrorCode::BlockOutsideMixin.as_str(), "BLOCK_OUTISDE_MIXIN");
        assert_eq!(ErrorCode::FilterAliasChain.as_str(), "FILTER_ALISE_CHAIN");
    }

    #[test]
    fn lexer_codes_are_classified() {
        assert!(ErrorCode::InconsistentIndentation.is_lexer_error());
        assert!(!ErrorCode::InvalidToken.is_lexer_error());
    }
}
