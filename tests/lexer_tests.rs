use pretty_assertions::assert_eq;
use sigma_tree::lexer::{Lexer, Token};

struct LexTestCase {
    expr: &'static str,
    tokens: Vec<Token>,
}

#[test]
fn lexer_cases() {
    let cases = vec![
        LexTestCase {
            expr: "selection",
            tokens: vec![Token::Identifier, Token::LitEof],
        },
        LexTestCase {
            expr: "selection_1 and not filter_0",
            tokens: vec![
                Token::Identifier,
                Token::KeywordAnd,
                Token::KeywordNot,
                Token::Identifier,
                Token::LitEof,
            ],
        },
        LexTestCase {
            expr: "((selection_1 and not filter_0) OR (keyword_0 and not filter1)) or idontcare",
            tokens: vec![
                Token::SepLpar,
                Token::SepLpar,
                Token::Identifier,
                Token::KeywordAnd,
                Token::KeywordNot,
                Token::Identifier,
                Token::SepRpar,
                Token::KeywordOr,
                Token::SepLpar,
                Token::Identifier,
                Token::KeywordAnd,
                Token::KeywordNot,
                Token::Identifier,
                Token::SepRpar,
                Token::SepRpar,
                Token::KeywordOr,
                Token::Identifier,
                Token::LitEof,
            ],
        },
        LexTestCase {
            expr: "all of selection* and not 1 of filter*",
            tokens: vec![
                Token::StmtAllOf,
                Token::IdentifierWithWildcard,
                Token::KeywordAnd,
                Token::KeywordNot,
                Token::StmtOneOf,
                Token::IdentifierWithWildcard,
                Token::LitEof,
            ],
        },
        LexTestCase {
            expr: "selection and not filter | count() > 10",
            tokens: vec![
                Token::Identifier,
                Token::KeywordAnd,
                Token::KeywordNot,
                Token::Identifier,
                Token::SepPipe,
                Token::Unsupported,
                Token::LitEof,
            ],
        },
        LexTestCase {
            expr: "1 of them",
            tokens: vec![Token::StmtOneOf, Token::IdentifierAll, Token::LitEof],
        },
        LexTestCase {
            expr: "all of them",
            tokens: vec![Token::StmtAllOf, Token::IdentifierAll, Token::LitEof],
        },
    ];

    for case in cases {
        let tokens: Vec<Token> = Lexer::new(case.expr).map(|item| item.token).collect();
        assert_eq!(tokens, case.tokens, "tokens for {:?}", case.expr);
    }
}

#[test]
fn exactly_one_eof_is_emitted() {
    for expr in ["", "selection", "a and b", "a | count() > 1", "(a)"] {
        let eofs = Lexer::new(expr)
            .filter(|item| item.token == Token::LitEof)
            .count();
        assert_eq!(eofs, 1, "eof count for {expr:?}");
    }
}

#[test]
fn items_carry_raw_values() {
    let items: Vec<_> = Lexer::new("(selection_1 or keyword*)").collect();
    let values: Vec<&str> = items.iter().map(|i| i.value.as_str()).collect();
    assert_eq!(values, vec!["(", "selection_1", "or", "keyword*", ")", ""]);
}

#[test]
fn keywords_are_case_insensitive() {
    let tokens: Vec<Token> = Lexer::new("a AND b OR NOT c")
        .map(|item| item.token)
        .collect();
    assert_eq!(
        tokens,
        vec![
            Token::Identifier,
            Token::KeywordAnd,
            Token::Identifier,
            Token::KeywordOr,
            Token::KeywordNot,
            Token::Identifier,
            Token::LitEof,
        ]
    );
}
