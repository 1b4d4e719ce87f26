//! Python front-end with tree-sitter integration.
//!
//! Lowers tree-sitter parse trees into neutral [`FunctionUnit`] trees:
//! module-level functions plus methods one class level deep. The bucketing
//! decisions here (what lands in positional children, what in named child
//! groups) must agree with the rendering templates in `core::hashing`, or
//! those templates would reject the trees as malformed.

use tree_sitter::{Node as TsNode, Parser};

use super::common::TreeFrontend;
use crate::core::errors::{DraupnirError, Result};
use crate::core::tree::{FunctionUnit, Node, NodeId, NodeKind, Role, SourceSpan};


/// Python front-end backed by the tree-sitter grammar.
pub struct PythonFrontend {
    parser: Parser,
}

impl PythonFrontend {
    /// Create a front-end with the Python grammar loaded.
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::LANGUAGE.into();
        parser.set_language(&language).map_err(|e| {
            DraupnirError::parse("python", format!("failed to load grammar: {e}"))
        })?;
        Ok(Self { parser })
    }
}

impl TreeFrontend for PythonFrontend {
    fn language(&self) -> &'static str {
        "python"
    }

    fn parse_source(&mut self, source: &str, file: &str) -> Result<Vec<FunctionUnit>> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| DraupnirError::parse_in_file("python", "failed to parse source", file))?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(DraupnirError::parse_in_file("python", "syntax error", file));
        }

        let lowering = Lowering { source, file };
        let mut units = Vec::new();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            lowering.collect_definitions(child, None, &mut units)?;
        }
        Ok(units)
    }
}

struct Lowering<'a> {
    source: &'a str,
    file: &'a str,
}

impl<'a> Lowering<'a> {
    fn text(&self, node: TsNode<'_>) -> Result<&'a str> {
        node.utf8_text(self.source.as_bytes()).map_err(Into::into)
    }

    fn span(&self, node: TsNode<'_>) -> SourceSpan {
        SourceSpan::new(node.start_byte(), node.end_byte())
    }

    fn missing(&self, what: &str) -> DraupnirError {
        DraupnirError::parse_in_file("python", format!("grammar node missing {what}"), self.file)
    }

    fn collect_definitions(
        &self,
        node: TsNode<'_>,
        class_name: Option<&str>,
        units: &mut Vec<FunctionUnit>,
    ) -> Result<()> {
        match node.kind() {
            "decorated_definition" => {
                if let Some(definition) = node.child_by_field_name("definition") {
                    self.collect_definitions(definition, class_name, units)?;
                }
            }
            "function_definition" => units.push(self.lower_function(node, class_name)?),
            // Methods are collected one class level deep; nested classes
            // stay opaque.
            "class_definition" if class_name.is_none() => {
                let name = node
                    .child_by_field_name("name")
                    .ok_or_else(|| self.missing("class name"))?;
                let class = self.text(name)?;
                if let Some(body) = node.child_by_field_name("body") {
                    let mut cursor = body.walk();
                    for child in body.children(&mut cursor) {
                        self.collect_definitions(child, Some(class), units)?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn lower_function(&self, node: TsNode<'_>, class_name: Option<&str>) -> Result<FunctionUnit> {
        let name_node = node
            .child_by_field_name("name")
            .ok_or_else(|| self.missing("function name"))?;
        let base = self.text(name_node)?;
        let name = match class_name {
            Some(class) => format!("{class}.{base}"),
            None => base.to_string(),
        };
        let mut unit = FunctionUnit::new(&name, self.file, self.span(node));

        if let Some(parameters) = node.child_by_field_name("parameters") {
            let mut cursor = parameters.walk();
            for parameter in parameters.named_children(&mut cursor) {
                if let Some(param) = self.parameter_name(parameter)? {
                    unit.add_param(param);
                }
            }
        }

        let body = node
            .child_by_field_name("body")
            .ok_or_else(|| self.missing("function body"))?;
        let mut cursor = body.walk();
        for statement in body.named_children(&mut cursor) {
            if let Some(id) = self.lower_statement(&mut unit, statement)? {
                unit.push_statement(id);
            }
        }
        Ok(unit)
    }

    fn parameter_name(&self, node: TsNode<'_>) -> Result<Option<&'a str>> {
        match node.kind() {
            "identifier" => Ok(Some(self.text(node)?)),
            "typed_parameter" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                Ok(self.first_identifier(node).map(|n| self.text(n)).transpose()?)
            }
            "default_parameter" | "typed_default_parameter" => Ok(node
                .child_by_field_name("name")
                .map(|n| self.text(n))
                .transpose()?),
            // `/` and `*` separators, tuple patterns
            _ => Ok(None),
        }
    }

    fn first_identifier<'t>(&self, node: TsNode<'t>) -> Option<TsNode<'t>> {
        let mut cursor = node.walk();
        let found = node
            .named_children(&mut cursor)
            .find(|child| child.kind() == "identifier");
        found
    }

    fn lower_block(&self, unit: &mut FunctionUnit, block: Option<TsNode<'_>>) -> Result<Vec<NodeId>> {
        let mut statements = Vec::new();
        if let Some(block) = block {
            let mut cursor = block.walk();
            let children: Vec<TsNode<'_>> = block.named_children(&mut cursor).collect();
            for child in children {
                if let Some(id) = self.lower_statement(unit, child)? {
                    statements.push(id);
                }
            }
        }
        Ok(statements)
    }

    fn lower_statement(&self, unit: &mut FunctionUnit, node: TsNode<'_>) -> Result<Option<NodeId>> {
        let id = match node.kind() {
            "comment" => return Ok(None),
            "expression_statement" => {
                let mut cursor = node.walk();
                let inner = node.named_children(&mut cursor).next();
                match inner {
                    Some(inner) => self.lower_expression(unit, inner)?,
                    None => return Ok(None),
                }
            }
            "if_statement" => self.lower_if(unit, node)?,
            "while_statement" => self.lower_while(unit, node)?,
            "for_statement" => self.lower_for(unit, node)?,
            "with_statement" => self.lower_with(unit, node)?,
            "return_statement" => self.lower_return(unit, node)?,
            "raise_statement" => self.lower_raise(unit, node)?,
            _ => self.other_leaf(unit, node),
        };
        Ok(Some(id))
    }

    fn lower_if(&self, unit: &mut FunctionUnit, node: TsNode<'_>) -> Result<NodeId> {
        let condition = node
            .child_by_field_name("condition")
            .ok_or_else(|| self.missing("if condition"))?;
        let test = self.lower_expression(unit, condition)?;
        let block = self.lower_block(unit, node.child_by_field_name("consequence"))?;

        let mut or_else = Vec::new();
        let mut cursor = node.walk();
        let arms: Vec<TsNode<'_>> = node.children(&mut cursor).collect();
        for arm in arms {
            match arm.kind() {
                "elif_clause" => {
                    let elif_condition = arm
                        .child_by_field_name("condition")
                        .ok_or_else(|| self.missing("elif condition"))?;
                    let elif_test = self.lower_expression(unit, elif_condition)?;
                    let elif_block =
                        self.lower_block(unit, arm.child_by_field_name("consequence"))?;
                    or_else.push(
                        unit.add_node(
                            Node::new(NodeKind::Elif, self.span(arm))
                                .with_role(Role::Test, vec![elif_test])
                                .with_role(Role::Block, elif_block),
                        ),
                    );
                }
                "else_clause" => {
                    let else_block = self.lower_block(unit, arm.child_by_field_name("body"))?;
                    or_else.push(unit.add_node(
                        Node::new(NodeKind::Else, self.span(arm)).with_role(Role::Block, else_block),
                    ));
                }
                _ => {}
            }
        }

        let mut if_node = Node::new(NodeKind::If, self.span(node))
            .with_role(Role::Test, vec![test])
            .with_role(Role::Block, block);
        if !or_else.is_empty() {
            if_node = if_node.with_role(Role::OrElse, or_else);
        }
        Ok(unit.add_node(if_node))
    }

    fn lower_while(&self, unit: &mut FunctionUnit, node: TsNode<'_>) -> Result<NodeId> {
        let condition = node
            .child_by_field_name("condition")
            .ok_or_else(|| self.missing("while condition"))?;
        let test = self.lower_expression(unit, condition)?;
        let block = self.lower_block(unit, node.child_by_field_name("body"))?;
        let mut while_node = Node::new(NodeKind::While, self.span(node))
            .with_role(Role::Test, vec![test])
            .with_role(Role::Block, block);
        if let Some(or_else) = self.lower_else_clause(unit, node)? {
            while_node = while_node.with_role(Role::OrElse, vec![or_else]);
        }
        Ok(unit.add_node(while_node))
    }

    fn lower_for(&self, unit: &mut FunctionUnit, node: TsNode<'_>) -> Result<NodeId> {
        let left = node
            .child_by_field_name("left")
            .ok_or_else(|| self.missing("for target"))?;
        let right = node
            .child_by_field_name("right")
            .ok_or_else(|| self.missing("for iterable"))?;
        let target = self.lower_expression(unit, left)?;
        let iterable = self.lower_expression(unit, right)?;
        let block = self.lower_block(unit, node.child_by_field_name("body"))?;
        let mut for_node = Node::new(NodeKind::For, self.span(node))
            .with_role(Role::Block, block)
            .with_args(vec![target, iterable]);
        if let Some(or_else) = self.lower_else_clause(unit, node)? {
            for_node = for_node.with_role(Role::OrElse, vec![or_else]);
        }
        Ok(unit.add_node(for_node))
    }

    fn lower_else_clause(
        &self,
        unit: &mut FunctionUnit,
        node: TsNode<'_>,
    ) -> Result<Option<NodeId>> {
        let mut cursor = node.walk();
        let clause = node
            .children(&mut cursor)
            .find(|child| child.kind() == "else_clause");
        match clause {
            Some(clause) => {
                let block = self.lower_block(unit, clause.child_by_field_name("body"))?;
                Ok(Some(unit.add_node(
                    Node::new(NodeKind::Else, self.span(clause)).with_role(Role::Block, block),
                )))
            }
            None => Ok(None),
        }
    }

    fn lower_with(&self, unit: &mut FunctionUnit, node: TsNode<'_>) -> Result<NodeId> {
        let mut exprs = Vec::new();
        let mut vars = Vec::new();
        let mut cursor = node.walk();
        let clauses: Vec<TsNode<'_>> = node
            .children(&mut cursor)
            .filter(|child| child.kind() == "with_clause")
            .collect();
        for clause in clauses {
            let mut item_cursor = clause.walk();
            let items: Vec<TsNode<'_>> = clause
                .named_children(&mut item_cursor)
                .filter(|item| item.kind() == "with_item")
                .collect();
            for item in items {
                let value = item
                    .child_by_field_name("value")
                    .ok_or_else(|| self.missing("with item value"))?;
                if value.kind() == "as_pattern" {
                    let expr = value
                        .named_child(0)
                        .ok_or_else(|| self.missing("with context expression"))?;
                    exprs.push(self.lower_expression(unit, expr)?);
                    if let Some(alias) = value.child_by_field_name("alias") {
                        let target = alias.named_child(0).unwrap_or(alias);
                        vars.push(self.lower_expression(unit, target)?);
                    }
                } else {
                    exprs.push(self.lower_expression(unit, value)?);
                }
            }
        }
        let block = self.lower_block(unit, node.child_by_field_name("body"))?;
        let mut with_node = Node::new(NodeKind::With, self.span(node))
            .with_role(Role::WithExpr, exprs)
            .with_role(Role::Block, block);
        if !vars.is_empty() {
            with_node = with_node.with_role(Role::WithVars, vars);
        }
        Ok(unit.add_node(with_node))
    }

    fn lower_return(&self, unit: &mut FunctionUnit, node: TsNode<'_>) -> Result<NodeId> {
        let mut cursor = node.walk();
        let inner = node.named_children(&mut cursor).next();
        let value = match inner {
            Some(expr) => self.lower_expression(unit, expr)?,
            // Bare `return` means `return None`; materializing the constant
            // keeps one rendering template for both spellings.
            None => unit.add_node(
                Node::new(NodeKind::Const, self.span(node)).with_identifier("None"),
            ),
        };
        Ok(unit.add_node(
            Node::new(NodeKind::Return, self.span(node)).with_role(Role::Value, vec![value]),
        ))
    }

    fn lower_raise(&self, unit: &mut FunctionUnit, node: TsNode<'_>) -> Result<NodeId> {
        let mut cursor = node.walk();
        let inner = node.named_children(&mut cursor).next();
        let mut raise_node = Node::new(NodeKind::Raise, self.span(node));
        if let Some(expr) = inner {
            let value = self.lower_expression(unit, expr)?;
            raise_node = raise_node.with_role(Role::Value, vec![value]);
        }
        Ok(unit.add_node(raise_node))
    }

    fn lower_expression(&self, unit: &mut FunctionUnit, node: TsNode<'_>) -> Result<NodeId> {
        let id = match node.kind() {
            "parenthesized_expression" => {
                let mut cursor = node.walk();
                let inner = node.named_children(&mut cursor).next();
                return match inner {
                    Some(inner) => self.lower_expression(unit, inner),
                    None => Ok(self.other_leaf(unit, node)),
                };
            }
            "identifier" => unit.add_node(
                Node::new(NodeKind::Ident, self.span(node)).with_identifier(self.text(node)?),
            ),
            "integer" | "float" => unit.add_node(
                Node::new(NodeKind::Num, self.span(node)).with_identifier(self.text(node)?),
            ),
            "string" | "concatenated_string" => unit.add_node(
                Node::new(NodeKind::Str, self.span(node)).with_identifier(self.text(node)?),
            ),
            "true" | "false" | "none" => unit.add_node(
                Node::new(NodeKind::Const, self.span(node)).with_identifier(self.text(node)?),
            ),
            "assignment" => match node.child_by_field_name("right") {
                Some(right) => {
                    let left = node
                        .child_by_field_name("left")
                        .ok_or_else(|| self.missing("assignment target"))?;
                    let value = self.lower_expression(unit, right)?;
                    let target = self.lower_expression(unit, left)?;
                    unit.add_node(
                        Node::new(NodeKind::Assign, self.span(node))
                            .with_role(Role::Value, vec![value])
                            .with_arg(target),
                    )
                }
                // Bare annotation, no value to match against.
                None => self.other_leaf(unit, node),
            },
            "augmented_assignment" => {
                let operator = node
                    .child_by_field_name("operator")
                    .ok_or_else(|| self.missing("augmented operator"))?;
                let tag = augmented_tag(self.text(operator)?)
                    .ok_or_else(|| self.missing("known augmented operator"))?;
                let left = node
                    .child_by_field_name("left")
                    .ok_or_else(|| self.missing("assignment target"))?;
                let right = node
                    .child_by_field_name("right")
                    .ok_or_else(|| self.missing("assignment value"))?;
                let value = self.lower_expression(unit, right)?;
                let target = self.lower_expression(unit, left)?;
                unit.add_node(
                    Node::new(NodeKind::AugAssign, self.span(node))
                        .with_identifier(tag)
                        .with_role(Role::Value, vec![value])
                        .with_arg(target),
                )
            }
            "binary_operator" | "boolean_operator" => {
                let operator = node
                    .child_by_field_name("operator")
                    .ok_or_else(|| self.missing("binary operator"))?;
                let tag = binary_tag(self.text(operator)?)
                    .ok_or_else(|| self.missing("known binary operator"))?;
                let left = node
                    .child_by_field_name("left")
                    .ok_or_else(|| self.missing("left operand"))?;
                let right = node
                    .child_by_field_name("right")
                    .ok_or_else(|| self.missing("right operand"))?;
                let left = self.lower_expression(unit, left)?;
                let right = self.lower_expression(unit, right)?;
                unit.add_node(
                    Node::new(NodeKind::BinaryOp, self.span(node))
                        .with_identifier(tag)
                        .with_role(Role::Left, vec![left])
                        .with_role(Role::Right, vec![right]),
                )
            }
            "unary_operator" => {
                let operator = node
                    .child_by_field_name("operator")
                    .ok_or_else(|| self.missing("unary operator"))?;
                let tag = unary_tag(self.text(operator)?)
                    .ok_or_else(|| self.missing("known unary operator"))?;
                let argument = node
                    .child_by_field_name("argument")
                    .ok_or_else(|| self.missing("unary operand"))?;
                let value = self.lower_expression(unit, argument)?;
                unit.add_node(
                    Node::new(NodeKind::UnaryOp, self.span(node))
                        .with_identifier(tag)
                        .with_role(Role::Value, vec![value]),
                )
            }
            "not_operator" => {
                let argument = node
                    .child_by_field_name("argument")
                    .ok_or_else(|| self.missing("unary operand"))?;
                let value = self.lower_expression(unit, argument)?;
                unit.add_node(
                    Node::new(NodeKind::UnaryOp, self.span(node))
                        .with_identifier("Not")
                        .with_role(Role::Value, vec![value]),
                )
            }
            "comparison_operator" => self.lower_comparison(unit, node)?,
            "call" => self.lower_call(unit, node)?,
            "attribute" => self.lower_attribute(unit, node)?,
            "tuple" | "expression_list" | "pattern_list" => {
                let mut cursor = node.walk();
                let elements: Vec<TsNode<'_>> = node.named_children(&mut cursor).collect();
                let mut args = Vec::with_capacity(elements.len());
                for element in elements {
                    args.push(self.lower_expression(unit, element)?);
                }
                unit.add_node(Node::new(NodeKind::Tuple, self.span(node)).with_args(args))
            }
            "list" => {
                let mut cursor = node.walk();
                let elements: Vec<TsNode<'_>> = node.named_children(&mut cursor).collect();
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.lower_expression(unit, element)?);
                }
                unit.add_node(
                    Node::new(NodeKind::List, self.span(node)).with_role(Role::Items, items),
                )
            }
            "lambda" => {
                let mut args = Vec::new();
                if let Some(parameters) = node.child_by_field_name("parameters") {
                    let mut cursor = parameters.walk();
                    let params: Vec<TsNode<'_>> = parameters.named_children(&mut cursor).collect();
                    for parameter in params {
                        if let Some(param) = self.parameter_name(parameter)? {
                            args.push(unit.add_node(
                                Node::new(NodeKind::Ident, self.span(parameter))
                                    .with_identifier(param),
                            ));
                        }
                    }
                }
                // Lambda bodies never participate in matching.
                unit.add_node(Node::new(NodeKind::Lambda, self.span(node)).with_args(args))
            }
            _ => self.other_leaf(unit, node),
        };
        Ok(id)
    }

    fn lower_comparison(&self, unit: &mut FunctionUnit, node: TsNode<'_>) -> Result<NodeId> {
        let mut operands: Vec<TsNode<'_>> = Vec::new();
        let mut tags: Vec<&'static str> = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        let mut cursor = node.walk();
        let children: Vec<TsNode<'_>> = node.children(&mut cursor).collect();
        for child in children {
            if child.is_named() {
                if child.kind() == "comment" {
                    continue;
                }
                if !operands.is_empty() {
                    let joined = pending.join(" ");
                    let tag = comparison_tag(&joined).ok_or_else(|| {
                        DraupnirError::parse_in_file(
                            "python",
                            format!("unknown comparison operator `{joined}`"),
                            self.file,
                        )
                    })?;
                    tags.push(tag);
                    pending.clear();
                }
                operands.push(child);
            } else {
                pending.push(self.text(child)?);
            }
        }
        if operands.len() < 2 || tags.len() != operands.len() - 1 {
            return Err(self.missing("comparison operands"));
        }

        let left = self.lower_expression(unit, operands[0])?;
        let mut comparators = Vec::with_capacity(operands.len() - 1);
        for operand in &operands[1..] {
            comparators.push(self.lower_expression(unit, *operand)?);
        }
        Ok(unit.add_node(
            Node::new(NodeKind::Compare, self.span(node))
                .with_identifier(tags.join(", "))
                .with_role(Role::Left, vec![left])
                .with_role(Role::Comparators, comparators),
        ))
    }

    fn lower_call(&self, unit: &mut FunctionUnit, node: TsNode<'_>) -> Result<NodeId> {
        let function = node
            .child_by_field_name("function")
            .ok_or_else(|| self.missing("call target"))?;

        let mut args = Vec::new();
        if let Some(list) = node.child_by_field_name("arguments") {
            let mut cursor = list.walk();
            let arguments: Vec<TsNode<'_>> = list.named_children(&mut cursor).collect();
            for argument in arguments {
                match argument.kind() {
                    // Keyword arguments never participated in matching.
                    "keyword_argument" | "dictionary_splat" | "comment" => {}
                    _ => args.push(self.lower_expression(unit, argument)?),
                }
            }
        }

        let call = match function.kind() {
            "identifier" => Node::new(NodeKind::Call, self.span(node))
                .with_identifier(self.text(function)?)
                .with_args(args),
            "attribute" => {
                let attribute = function
                    .child_by_field_name("attribute")
                    .ok_or_else(|| self.missing("call attribute"))?;
                let object = function
                    .child_by_field_name("object")
                    .ok_or_else(|| self.missing("call receiver"))?;
                let owner = match self.dotted_owner(object)? {
                    Some(owner) => owner,
                    None => self.text(object)?.to_string(),
                };
                Node::new(NodeKind::Call, self.span(node))
                    .with_identifier(self.text(attribute)?)
                    .with_owner(owner)
                    .with_args(args)
            }
            _ => Node::new(NodeKind::Call, self.span(node))
                .with_identifier(self.text(function)?)
                .with_args(args),
        };
        Ok(unit.add_node(call))
    }

    fn lower_attribute(&self, unit: &mut FunctionUnit, node: TsNode<'_>) -> Result<NodeId> {
        let object = node
            .child_by_field_name("object")
            .ok_or_else(|| self.missing("attribute receiver"))?;
        let attribute = node
            .child_by_field_name("attribute")
            .ok_or_else(|| self.missing("attribute name"))?;
        let name = self.text(attribute)?;
        match self.dotted_owner(object)? {
            Some(owner) => Ok(unit.add_node(
                Node::new(NodeKind::Attribute, self.span(node))
                    .with_identifier(name)
                    .with_owner(owner),
            )),
            None => {
                let receiver = self.lower_expression(unit, object)?;
                Ok(unit.add_node(
                    Node::new(NodeKind::Attribute, self.span(node))
                        .with_identifier(name)
                        .with_arg(receiver),
                ))
            }
        }
    }

    /// Dotted spelling for plain identifier/attribute receiver chains, for
    /// example `self.cfg`. Anything else (subscripts, calls) gets lowered
    /// as a child expression instead.
    fn dotted_owner(&self, node: TsNode<'_>) -> Result<Option<String>> {
        match node.kind() {
            "identifier" => Ok(Some(self.text(node)?.to_string())),
            "attribute" => {
                let object = node
                    .child_by_field_name("object")
                    .ok_or_else(|| self.missing("attribute receiver"))?;
                let attribute = node
                    .child_by_field_name("attribute")
                    .ok_or_else(|| self.missing("attribute name"))?;
                match self.dotted_owner(object)? {
                    Some(prefix) => Ok(Some(format!("{prefix}.{}", self.text(attribute)?))),
                    None => Ok(None),
                }
            }
            _ => Ok(None),
        }
    }

    fn other_leaf(&self, unit: &mut FunctionUnit, node: TsNode<'_>) -> NodeId {
        unit.add_node(Node::new(NodeKind::Other, self.span(node)).with_identifier(node.kind()))
    }
}

fn binary_tag(token: &str) -> Option<&'static str> {
    Some(match token {
        "+" => "Add",
        "-" => "Sub",
        "*" => "Mult",
        "/" => "Div",
        "//" => "FloorDiv",
        "%" => "Mod",
        "**" => "Pow",
        "@" => "MatMult",
        "|" => "BitOr",
        "&" => "BitAnd",
        "^" => "BitXor",
        "<<" => "LShift",
        ">>" => "RShift",
        "and" => "And",
        "or" => "Or",
        _ => return None,
    })
}

fn augmented_tag(token: &str) -> Option<&'static str> {
    binary_tag(token.strip_suffix('=')?)
}

fn unary_tag(token: &str) -> Option<&'static str> {
    Some(match token {
        "-" => "USub",
        "+" => "UAdd",
        "~" => "Invert",
        _ => return None,
    })
}

fn comparison_tag(token: &str) -> Option<&'static str> {
    Some(match token {
        "<" => "Lt",
        ">" => "Gt",
        "<=" => "LtE",
        ">=" => "GtE",
        "==" => "Eq",
        "!=" | "<>" => "NotEq",
        "in" => "In",
        "not in" => "NotIn",
        "is" => "Is",
        "is not" => "IsNot",
        _ => return None,
    })
}
