// src/units/tables.rs
//! Built-in syntactic-unit tables.

use std::collections::HashMap;

/// Every Esprima syntax node type.
pub const ESPRIMA_SYNTAX: &[&str] = &[
    "AssignmentExpression",
    "AssignmentPattern",
    "ArrayExpression",
    "ArrayPattern",
    "ArrowFunctionExpression",
    "AwaitExpression",
    "BlockStatement",
    "BinaryExpression",
    "BreakStatement",
    "CallExpression",
    "CatchClause",
    "ClassBody",
    "ClassDeclaration",
    "ClassExpression",
    "ConditionalExpression",
    "ContinueStatement",
    "DoWhileStatement",
    "DebuggerStatement",
    "EmptyStatement",
    "ExportAllDeclaration",
    "ExportDefaultDeclaration",
    "ExportNamedDeclaration",
    "ExportSpecifier",
    "ExpressionStatement",
    "ForStatement",
    "ForOfStatement",
    "ForInStatement",
    "FunctionDeclaration",
    "FunctionExpression",
    "Identifier",
    "IfStatement",
    "Import",
    "ImportDeclaration",
    "ImportDefaultSpecifier",
    "ImportNamespaceSpecifier",
    "ImportSpecifier",
    "Literal",
    "LabeledStatement",
    "LogicalExpression",
    "MemberExpression",
    "MetaProperty",
    "MethodDefinition",
    "NewExpression",
    "ObjectExpression",
    "ObjectPattern",
    "Program",
    "Property",
    "RestElement",
    "ReturnStatement",
    "SequenceExpression",
    "SpreadElement",
    "Super",
    "SwitchCase",
    "SwitchStatement",
    "TaggedTemplateExpression",
    "TemplateElement",
    "TemplateLiteral",
    "ThisExpression",
    "ThrowStatement",
    "TryStatement",
    "UnaryExpression",
    "UpdateExpression",
    "VariableDeclaration",
    "VariableDeclarator",
    "WhileStatement",
    "WithStatement",
    "YieldExpression",
];

/// Comment node kinds the parser emits alongside syntax nodes.
pub const ESPRIMA_COMMENTS: &[&str] = &["LineComment", "BlockComment"];

/// Esprima lexical token kinds, in code order.
pub const ESPRIMA_TOKENS: &[&str] = &[
    "Boolean",
    "<end>",
    "Identifier",
    "Keyword",
    "Null",
    "Numeric",
    "Punctuator",
    "String",
    "RegularExpression",
    "Template",
    "LineComment",
    "BlockComment",
];

/// Suffix families collapsed to one code each, in code order (0..=6).
const FAMILY_SUFFIXES: &[&str] = &[
    "Expression",
    "Element",
    "Statement",
    "Literal",
    "Declaration",
    "Pattern",
    "Specifier",
];

/// Node kinds that keep a code of their own after the comment family (8..=18).
const SINGLETONS: &[&str] = &[
    "Program",
    "Property",
    "Super",
    "SwitchCase",
    "VariableDeclarator",
    "CatchClause",
    "ClassBody",
    "Identifier",
    "Import",
    "MetaProperty",
    "MethodDefinition",
];

/// Full AST table: node kinds sorted by name, comments appended.
#[must_use]
pub fn esprima_ast() -> HashMap<String, u32> {
    let mut names: Vec<&str> = ESPRIMA_SYNTAX.to_vec();
    names.sort_unstable();
    names
        .into_iter()
        .chain(ESPRIMA_COMMENTS.iter().copied())
        .zip(0u32..)
        .map(|(name, code)| (name.to_string(), code))
        .collect()
}

/// Simplified AST table: 19 coarse syntactic families.
#[must_use]
pub fn esprima_ast_simplified() -> HashMap<String, u32> {
    let comment_code = FAMILY_SUFFIXES.iter().fold(0u32, |n, _| n + 1);
    let mut table = HashMap::new();

    for name in ESPRIMA_SYNTAX {
        if let Some(code) = simplified_code(name, comment_code) {
            table.insert((*name).to_string(), code);
        }
    }
    for name in ESPRIMA_COMMENTS {
        table.insert((*name).to_string(), comment_code);
    }
    table
}

fn simplified_code(name: &str, comment_code: u32) -> Option<u32> {
    let singleton = SINGLETONS
        .iter()
        .zip(comment_code + 1..)
        .find(|(s, _)| **s == name);
    if let Some((_, code)) = singleton {
        return Some(code);
    }
    FAMILY_SUFFIXES
        .iter()
        .zip(0u32..)
        .find(|(suffix, _)| name.ends_with(**suffix))
        .map(|(_, code)| code)
}

/// Lexical token table.
#[must_use]
pub fn esprima_tokens() -> HashMap<String, u32> {
    ESPRIMA_TOKENS
        .iter()
        .zip(0u32..)
        .map(|(name, code)| ((*name).to_string(), code))
        .collect()
}
