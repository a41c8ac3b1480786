use crate::lexer::Lexer;
use crate::token::{Token, TokenKind, BUILTIN_TYPE_NAMES, RESERVED_WORDS};
use smi_ast::{
    AccessAst, AgentCapabilitiesAst, ComplianceModuleAst, ConstraintList, ConstraintRange,
    DefValAst, Definition, EnumItem, Ident, ImportAst, IndexColumnAst, ModuleAst,
    ModuleComplianceAst, ModuleIdentityAst, NotificationGroupAst, NotificationTypeAst,
    ObjectGroupAst, ObjectIdValueAst, ObjectIdentityAst, ObjectTypeAst, OidComponent, RevisionAst,
    SequenceField, StatusAst, SupportsModuleAst, TextualConventionAst, TrapTypeAst,
    TypeAssignmentAst, TypeSyntax, ValueAssignmentAst,
};
use smi_diagnostics::{codes, Diagnostic, DiagnosticConfig, Strictness};
use smi_source_file::{LineIndex, SourceCode};
use smi_text_size::{Ranged, TextRange, TextSize};

/// Parses one module's source text into an AST plus the accumulated
/// lexer+parser diagnostics (spec.md §4.2). Never panics on malformed input:
/// a definition that cannot be parsed is discarded and the parser resumes at
/// the next recognizable boundary.
pub fn parse_module(
    text: &str,
    module_name: &str,
    strictness: Strictness,
    config: &DiagnosticConfig,
) -> (Option<ModuleAst>, Vec<Diagnostic>) {
    let line_index = LineIndex::from_source_text(text);
    let source = SourceCode::new(text, &line_index);

    let mut lexer = Lexer::new(text);
    let mut tokens = Vec::new();
    let mut diagnostics = Vec::new();
    loop {
        let result = lexer.next_token(config, strictness, module_name, &source);
        diagnostics.extend(result.diagnostics);
        let at_end = matches!(result.token.kind, TokenKind::Eof);
        tokens.push(result.token);
        if at_end {
            break;
        }
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        diagnostics,
        module: module_name,
        source,
        strictness,
    };
    let module = parser.parse_module();
    (module, parser.diagnostics)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    module: &'a str,
    source: SourceCode<'a>,
    strictness: Strictness,
}

impl<'a> Parser<'a> {
    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self, ahead: usize) -> &TokenKind {
        let idx = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn at_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn is_word(&self, text: &str) -> bool {
        self.current().is_word(text)
    }

    fn error_at(&mut self, code: &str, message: impl Into<String>, offset: TextSize) {
        self.diagnostics.push(Diagnostic::new(
            code,
            message,
            self.module,
            offset,
            &self.source,
        ));
    }

    fn missing_clause(&mut self, clause: &str, at: TextRange) {
        let code = codes::missing_clause(clause);
        let message = format!("missing required clause `{clause}`");
        let severity = self.strictness.missing_clause_severity();
        self.diagnostics.push(Diagnostic::with_severity(
            severity,
            code,
            message,
            self.module,
            at.start(),
            &self.source,
        ));
    }

    fn duplicate_clause(&mut self, clause: &str, at: TextRange) {
        let code = codes::duplicate_clause(clause);
        self.error_at(&code, format!("duplicate clause `{clause}`"), at.start());
    }

    /// Expects a `Word` token, consumes it, and turns it into an [`Ident`].
    /// On mismatch, emits a diagnostic but does not advance, so the caller's
    /// recovery logic can decide what to skip.
    fn expect_name(&mut self) -> Option<Ident> {
        self.expect_name_allowing(|_| false)
    }

    /// Like `expect_name`, but does not raise `keyword-reserved` for one of
    /// the eight built-in SMI type names — legal in an IMPORTS symbol list,
    /// which is not "a position expecting a user name" (spec.md §4.1).
    fn expect_import_symbol(&mut self) -> Option<Ident> {
        self.expect_name_allowing(|text| BUILTIN_TYPE_NAMES.contains(&text))
    }

    fn expect_name_allowing(&mut self, allow_reserved: impl Fn(&str) -> bool) -> Option<Ident> {
        if let TokenKind::Word(text) = &self.current().kind {
            let text = text.clone();
            if RESERVED_WORDS.contains(&text.as_str()) && !allow_reserved(&text) {
                self.error_at(
                    codes::KEYWORD_RESERVED,
                    format!("`{text}` is a reserved word and cannot be used as a name here"),
                    self.current().range.start(),
                );
            }
            let range = self.current().range;
            self.advance();
            Some(Ident::new(text, range))
        } else {
            let range = self.current().range;
            self.error_at(
                "lex-invalid-char",
                format!("expected a name, found `{}`", self.current().kind),
                range.start(),
            );
            None
        }
    }

    fn expect_word(&mut self, word: &str) -> bool {
        if self.is_word(word) {
            self.advance();
            true
        } else {
            let range = self.current().range;
            self.error_at(
                "lex-invalid-char",
                format!("expected `{word}`, found `{}`", self.current().kind),
                range.start(),
            );
            false
        }
    }

    fn expect_kind(&mut self, kind: &TokenKind) -> bool {
        if &self.current().kind == kind {
            self.advance();
            true
        } else {
            let range = self.current().range;
            self.error_at(
                "lex-invalid-char",
                format!("expected `{kind}`, found `{}`", self.current().kind),
                range.start(),
            );
            false
        }
    }

    /// Discards tokens until `END` or a plausible top-level definition start
    /// (`Word` followed by one of the dispatch keywords, or `Word ::=`), per
    /// spec.md §4.2's error-recovery contract.
    fn recover_to_next_definition(&mut self) {
        loop {
            if self.at_eof() || self.is_word("END") {
                return;
            }
            if matches!(self.current().kind, TokenKind::Word(_)) && self.starts_definition() {
                return;
            }
            self.advance();
        }
    }

    fn starts_definition(&self) -> bool {
        matches!(self.peek_kind(1), TokenKind::Assign)
            || matches!(self.peek_kind(1), TokenKind::Word(w) if is_macro_keyword(w))
    }

    fn parse_module(&mut self) -> Option<ModuleAst> {
        let name = self.expect_name()?;
        self.expect_word("DEFINITIONS");
        // Tolerate SMIv1/v2 tagging modifiers (`IMPLICIT TAGS`, `EXPLICIT
        // TAGS`) between `DEFINITIONS` and `::=`.
        while !matches!(self.current().kind, TokenKind::Assign) && !self.at_eof() {
            self.advance();
        }
        self.expect_kind(&TokenKind::Assign);
        self.expect_word("BEGIN");

        let imports = self.parse_imports();
        let exports_present = self.parse_optional_exports();

        let mut definitions = Vec::new();
        while !self.at_eof() && !self.is_word("END") {
            if let Some(def) = self.parse_definition() {
                definitions.push(def);
            }
        }
        self.expect_word("END");

        Some(ModuleAst {
            name,
            imports,
            exports_present,
            definitions,
        })
    }

    fn parse_imports(&mut self) -> Vec<ImportAst> {
        let mut imports = Vec::new();
        if !self.is_word("IMPORTS") {
            return imports;
        }
        self.advance();
        // Each iteration parses one `Sym1, Sym2 FROM Module` group; the
        // clause ends at `;`.
        loop {
            if self.at_eof() || matches!(self.current().kind, TokenKind::Semicolon) {
                break;
            }
            let group_start = self.current().range;
            let mut symbols = Vec::new();
            while matches!(&self.current().kind, TokenKind::Word(w) if w.as_str() != "FROM") {
                if let Some(name) = self.expect_import_symbol() {
                    symbols.push(name);
                } else {
                    break;
                }
                if matches!(self.current().kind, TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
            if !self.is_word("FROM") {
                // Malformed group; stop rather than loop forever.
                break;
            }
            self.advance();
            let Some(module) = self.expect_name() else {
                break;
            };
            let end = module.range();
            imports.push(ImportAst {
                symbols,
                from_module: module,
                range: TextRange::new(group_start.start(), end.end()),
            });
        }
        self.expect_kind(&TokenKind::Semicolon);
        imports
    }

    /// Legacy SMIv1 `EXPORTS ... ;`. Parsed and discarded: spec.md/§4.2
    /// never uses it for symbol binding (SPEC_FULL.md supplement).
    fn parse_optional_exports(&mut self) -> bool {
        if !self.is_word("EXPORTS") {
            return false;
        }
        let range = self.current().range;
        self.advance();
        while !self.at_eof() && !matches!(self.current().kind, TokenKind::Semicolon) {
            self.advance();
        }
        self.expect_kind(&TokenKind::Semicolon);
        self.error_at(
            codes::EXPORTS_CLAUSE_IGNORED,
            "EXPORTS clause parsed and ignored",
            range.start(),
        );
        true
    }

    fn parse_definition(&mut self) -> Option<Definition> {
        let name = self.expect_name();
        let Some(name) = name else {
            self.recover_to_next_definition();
            return None;
        };

        let result = if self.is_word("OBJECT") && matches!(self.peek_kind(1), TokenKind::Word(w) if w.as_str() == "IDENTIFIER")
        {
            self.advance();
            self.advance();
            self.parse_value_assignment(name)
        } else if self.is_word("OBJECT-TYPE") {
            self.advance();
            self.parse_object_type(name)
        } else if self.is_word("OBJECT-IDENTITY") {
            self.advance();
            self.parse_object_identity(name)
        } else if self.is_word("MODULE-IDENTITY") {
            self.advance();
            self.parse_module_identity(name)
        } else if self.is_word("NOTIFICATION-TYPE") {
            self.advance();
            self.parse_notification_type(name)
        } else if self.is_word("TRAP-TYPE") {
            self.advance();
            self.parse_trap_type(name)
        } else if self.is_word("OBJECT-GROUP") {
            self.advance();
            self.parse_object_group(name)
        } else if self.is_word("NOTIFICATION-GROUP") {
            self.advance();
            self.parse_notification_group(name)
        } else if self.is_word("MODULE-COMPLIANCE") {
            self.advance();
            self.parse_module_compliance(name)
        } else if self.is_word("AGENT-CAPABILITIES") {
            self.advance();
            self.parse_agent_capabilities(name)
        } else if matches!(self.current().kind, TokenKind::Assign) {
            self.advance();
            if self.is_word("TEXTUAL-CONVENTION") {
                self.advance();
                self.parse_textual_convention(name)
            } else {
                self.parse_type_assignment(name)
            }
        } else {
            let range = self.current().range;
            self.error_at(
                "lex-invalid-char",
                format!(
                    "unexpected token `{}` after name `{}`",
                    self.current().kind,
                    name
                ),
                range.start(),
            );
            None
        };

        if result.is_none() {
            self.recover_to_next_definition();
        }
        result
    }

    fn parse_value_assignment(&mut self, name: Ident) -> Option<Definition> {
        self.expect_kind(&TokenKind::Assign);
        let value = self.parse_oid_value()?;
        let range = TextRange::new(name.range().start(), value.range.end());
        Some(Definition::Value(ValueAssignmentAst {
            name,
            value,
            range,
        }))
    }

    fn parse_type_assignment(&mut self, name: Ident) -> Option<Definition> {
        let syntax = self.parse_type_syntax()?;
        let range = TextRange::new(name.range().start(), self.current().range.start());
        Some(Definition::Type(TypeAssignmentAst {
            name,
            syntax,
            range,
        }))
    }

    fn parse_textual_convention(&mut self, name: Ident) -> Option<Definition> {
        let start = name.range();
        let mut display_hint = None;
        let mut status = None;
        let mut description = None;
        let mut reference = None;

        loop {
            if self.is_word("DISPLAY-HINT") {
                self.advance();
                display_hint = self.parse_quoted_string();
            } else if self.is_word("STATUS") {
                self.advance();
                status = self.parse_status();
            } else if self.is_word("DESCRIPTION") {
                self.advance();
                description = self.parse_quoted_string();
            } else if self.is_word("REFERENCE") {
                self.advance();
                reference = self.parse_quoted_string();
            } else if self.is_word("SYNTAX") {
                break;
            } else {
                break;
            }
        }
        if status.is_none() {
            self.missing_clause("status", start);
        }
        if description.is_none() {
            self.missing_clause("description", start);
        }
        if !self.expect_word("SYNTAX") {
            return None;
        }
        let syntax = self.parse_type_syntax()?;
        let range = TextRange::new(start.start(), self.current().range.start());
        Some(Definition::TextualConvention(TextualConventionAst {
            name,
            display_hint,
            status,
            description,
            reference,
            syntax,
            range,
        }))
    }

    fn parse_object_type(&mut self, name: Ident) -> Option<Definition> {
        let start = name.range();
        let mut syntax = None;
        let mut units = None;
        let mut access = None;
        let mut status = None;
        let mut description = None;
        let mut reference = None;
        let mut index = None;
        let mut augments = None;
        let mut defval = None;

        loop {
            if self.is_word("SYNTAX") {
                if syntax.is_some() {
                    self.duplicate_clause("syntax", self.current().range);
                }
                self.advance();
                syntax = self.parse_type_syntax();
            } else if self.is_word("UNITS") {
                self.advance();
                units = self.parse_quoted_string();
            } else if self.is_word("MAX-ACCESS") || self.is_word("ACCESS") {
                if access.is_some() {
                    self.duplicate_clause("access", self.current().range);
                }
                self.advance();
                access = self.parse_access();
            } else if self.is_word("STATUS") {
                self.advance();
                status = self.parse_status();
            } else if self.is_word("DESCRIPTION") {
                self.advance();
                description = self.parse_quoted_string();
            } else if self.is_word("REFERENCE") {
                self.advance();
                reference = self.parse_quoted_string();
            } else if self.is_word("INDEX") {
                self.advance();
                index = self.parse_index_clause();
            } else if self.is_word("AUGMENTS") {
                self.advance();
                augments = self.parse_augments_clause();
            } else if self.is_word("DEFVAL") {
                self.advance();
                defval = self.parse_defval_clause();
            } else {
                break;
            }
        }

        if syntax.is_none() {
            self.missing_clause("syntax", start);
        }
        if access.is_none() {
            self.missing_clause("max-access", start);
        }
        if status.is_none() {
            self.missing_clause("status", start);
        }

        self.expect_kind(&TokenKind::Assign);
        let value = self.parse_oid_value()?;
        let range = TextRange::new(start.start(), value.range.end());
        Some(Definition::ObjectType(ObjectTypeAst {
            name,
            syntax: syntax.unwrap_or(TypeSyntax::Named(Ident::new("Unknown", start))),
            units,
            access,
            status,
            description,
            reference,
            index,
            augments,
            defval,
            value,
            range,
        }))
    }

    fn parse_object_identity(&mut self, name: Ident) -> Option<Definition> {
        let start = name.range();
        let mut status = None;
        let mut description = None;
        let mut reference = None;
        loop {
            if self.is_word("STATUS") {
                self.advance();
                status = self.parse_status();
            } else if self.is_word("DESCRIPTION") {
                self.advance();
                description = self.parse_quoted_string();
            } else if self.is_word("REFERENCE") {
                self.advance();
                reference = self.parse_quoted_string();
            } else {
                break;
            }
        }
        if status.is_none() {
            self.missing_clause("status", start);
        }
        if description.is_none() {
            self.missing_clause("description", start);
        }
        self.expect_kind(&TokenKind::Assign);
        let value = self.parse_oid_value()?;
        let range = TextRange::new(start.start(), value.range.end());
        Some(Definition::ObjectIdentity(ObjectIdentityAst {
            name,
            status,
            description,
            reference,
            value,
            range,
        }))
    }

    fn parse_module_identity(&mut self, name: Ident) -> Option<Definition> {
        let start = name.range();
        let mut last_updated = None;
        let mut organization = None;
        let mut contact_info = None;
        let mut description = None;
        let mut revisions = Vec::new();
        loop {
            if self.is_word("LAST-UPDATED") {
                self.advance();
                last_updated = self.parse_quoted_string();
            } else if self.is_word("ORGANIZATION") {
                self.advance();
                organization = self.parse_quoted_string();
            } else if self.is_word("CONTACT-INFO") {
                self.advance();
                contact_info = self.parse_quoted_string();
            } else if self.is_word("DESCRIPTION") {
                self.advance();
                description = self.parse_quoted_string();
            } else if self.is_word("REVISION") {
                self.advance();
                let date = self.parse_quoted_string().unwrap_or_default();
                let rev_description = if self.is_word("DESCRIPTION") {
                    self.advance();
                    self.parse_quoted_string()
                } else {
                    None
                };
                revisions.push(RevisionAst {
                    date,
                    description: rev_description,
                });
            } else {
                break;
            }
        }
        if last_updated.is_none() {
            self.missing_clause("last-updated", start);
        }
        if organization.is_none() {
            self.missing_clause("organization", start);
        }
        if contact_info.is_none() {
            self.missing_clause("contact-info", start);
        }
        if description.is_none() {
            self.missing_clause("description", start);
        }
        self.expect_kind(&TokenKind::Assign);
        let value = self.parse_oid_value()?;
        let range = TextRange::new(start.start(), value.range.end());
        Some(Definition::ModuleIdentity(ModuleIdentityAst {
            name,
            last_updated,
            organization,
            contact_info,
            description,
            revisions,
            value,
            range,
        }))
    }

    fn parse_notification_type(&mut self, name: Ident) -> Option<Definition> {
        let start = name.range();
        let mut objects = Vec::new();
        let mut status = None;
        let mut description = None;
        let mut reference = None;
        loop {
            if self.is_word("OBJECTS") {
                self.advance();
                objects = self.parse_name_list();
            } else if self.is_word("STATUS") {
                self.advance();
                status = self.parse_status();
            } else if self.is_word("DESCRIPTION") {
                self.advance();
                description = self.parse_quoted_string();
            } else if self.is_word("REFERENCE") {
                self.advance();
                reference = self.parse_quoted_string();
            } else {
                break;
            }
        }
        if status.is_none() {
            self.missing_clause("status", start);
        }
        if description.is_none() {
            self.missing_clause("description", start);
        }
        self.expect_kind(&TokenKind::Assign);
        let value = self.parse_oid_value()?;
        let range = TextRange::new(start.start(), value.range.end());
        Some(Definition::NotificationType(NotificationTypeAst {
            name,
            objects,
            status,
            description,
            reference,
            value,
            range,
        }))
    }

    /// SMIv1 `TRAP-TYPE`: unlike every other macro, the value after `::=` is
    /// a bare specific-trap number, not OID braces (spec.md §4.2, §9 TRAP-TYPE
    /// reconciliation).
    fn parse_trap_type(&mut self, name: Ident) -> Option<Definition> {
        let start = name.range();
        let mut enterprise = None;
        let mut variables = Vec::new();
        let mut description = None;
        let mut reference = None;
        loop {
            if self.is_word("ENTERPRISE") {
                self.advance();
                enterprise = self.expect_name();
            } else if self.is_word("VARIABLES") {
                self.advance();
                variables = self.parse_name_list();
            } else if self.is_word("DESCRIPTION") {
                self.advance();
                description = self.parse_quoted_string();
            } else if self.is_word("REFERENCE") {
                self.advance();
                reference = self.parse_quoted_string();
            } else {
                break;
            }
        }
        let Some(enterprise) = enterprise else {
            self.missing_clause("enterprise", start);
            return None;
        };
        if description.is_none() {
            self.missing_clause("description", start);
        }
        self.expect_kind(&TokenKind::Assign);
        let number_range = self.current().range;
        let specific_trap_number = match self.current().kind {
            TokenKind::Number(n) => {
                self.advance();
                n.try_into().unwrap_or(0)
            }
            _ => {
                self.error_at(
                    "lex-invalid-char",
                    "expected a specific-trap number after `::=`",
                    number_range.start(),
                );
                return None;
            }
        };
        let range = TextRange::new(start.start(), number_range.end());
        Some(Definition::TrapType(TrapTypeAst {
            name,
            enterprise,
            variables,
            description,
            reference,
            specific_trap_number,
            range,
        }))
    }

    fn parse_object_group(&mut self, name: Ident) -> Option<Definition> {
        let start = name.range();
        let mut objects = Vec::new();
        let mut status = None;
        let mut description = None;
        let mut reference = None;
        loop {
            if self.is_word("OBJECTS") {
                self.advance();
                objects = self.parse_name_list();
            } else if self.is_word("STATUS") {
                self.advance();
                status = self.parse_status();
            } else if self.is_word("DESCRIPTION") {
                self.advance();
                description = self.parse_quoted_string();
            } else if self.is_word("REFERENCE") {
                self.advance();
                reference = self.parse_quoted_string();
            } else {
                break;
            }
        }
        if objects.is_empty() {
            self.missing_clause("objects", start);
        }
        if status.is_none() {
            self.missing_clause("status", start);
        }
        self.expect_kind(&TokenKind::Assign);
        let value = self.parse_oid_value()?;
        let range = TextRange::new(start.start(), value.range.end());
        Some(Definition::ObjectGroup(ObjectGroupAst {
            name,
            objects,
            status,
            description,
            reference,
            value,
            range,
        }))
    }

    fn parse_notification_group(&mut self, name: Ident) -> Option<Definition> {
        let start = name.range();
        let mut notifications = Vec::new();
        let mut status = None;
        let mut description = None;
        let mut reference = None;
        loop {
            if self.is_word("NOTIFICATIONS") {
                self.advance();
                notifications = self.parse_name_list();
            } else if self.is_word("STATUS") {
                self.advance();
                status = self.parse_status();
            } else if self.is_word("DESCRIPTION") {
                self.advance();
                description = self.parse_quoted_string();
            } else if self.is_word("REFERENCE") {
                self.advance();
                reference = self.parse_quoted_string();
            } else {
                break;
            }
        }
        if notifications.is_empty() {
            self.missing_clause("notifications", start);
        }
        if status.is_none() {
            self.missing_clause("status", start);
        }
        self.expect_kind(&TokenKind::Assign);
        let value = self.parse_oid_value()?;
        let range = TextRange::new(start.start(), value.range.end());
        Some(Definition::NotificationGroup(NotificationGroupAst {
            name,
            notifications,
            status,
            description,
            reference,
            value,
            range,
        }))
    }

    fn parse_module_compliance(&mut self, name: Ident) -> Option<Definition> {
        let start = name.range();
        let mut status = None;
        let mut description = None;
        let mut reference = None;
        let mut modules = Vec::new();
        loop {
            if self.is_word("STATUS") {
                self.advance();
                status = self.parse_status();
            } else if self.is_word("DESCRIPTION") {
                self.advance();
                description = self.parse_quoted_string();
            } else if self.is_word("REFERENCE") {
                self.advance();
                reference = self.parse_quoted_string();
            } else if self.is_word("MODULE") {
                modules.push(self.parse_compliance_module());
            } else {
                break;
            }
        }
        if status.is_none() {
            self.missing_clause("status", start);
        }
        if description.is_none() {
            self.missing_clause("description", start);
        }
        self.expect_kind(&TokenKind::Assign);
        let value = self.parse_oid_value()?;
        let range = TextRange::new(start.start(), value.range.end());
        Some(Definition::ModuleCompliance(ModuleComplianceAst {
            name,
            status,
            description,
            reference,
            modules,
            value,
            range,
        }))
    }

    fn parse_compliance_module(&mut self) -> ComplianceModuleAst {
        self.advance(); // MODULE
        let names_this_compliance_module = matches!(&self.current().kind, TokenKind::Word(w)
            if !is_macro_keyword(w)
                && w.as_str() != "MANDATORY-GROUPS"
                && w.as_str() != "GROUP"
                && w.as_str() != "OBJECT");
        let module_name = if names_this_compliance_module {
            self.expect_name()
        } else {
            None
        };
        let mut mandatory_groups = Vec::new();
        let mut members = Vec::new();
        loop {
            if self.is_word("MANDATORY-GROUPS") {
                self.advance();
                mandatory_groups = self.parse_name_list();
            } else if self.is_word("GROUP") || self.is_word("OBJECT") {
                self.advance();
                if let Some(member) = self.expect_name() {
                    members.push(member);
                }
                // Refinement clauses (SYNTAX/WRITE-SYNTAX/MIN-ACCESS/
                // DESCRIPTION) are skipped: only membership is modeled.
                while self.is_word("SYNTAX")
                    || self.is_word("WRITE-SYNTAX")
                    || self.is_word("MIN-ACCESS")
                    || self.is_word("DESCRIPTION")
                {
                    self.advance();
                    if self.is_word("DESCRIPTION") {
                        continue;
                    }
                    // Skip one type-syntax or access-keyword token run.
                    self.skip_balanced_once();
                }
            } else {
                break;
            }
        }
        ComplianceModuleAst {
            module_name,
            mandatory_groups,
            members,
        }
    }

    /// Skips a single refinement value: either a brace-delimited group or a
    /// run of tokens up to the next clause keyword / `MODULE` / `::=`.
    fn skip_balanced_once(&mut self) {
        if matches!(self.current().kind, TokenKind::LBrace) {
            let mut depth = 0usize;
            loop {
                match self.current().kind {
                    TokenKind::LBrace => {
                        depth += 1;
                        self.advance();
                    }
                    TokenKind::RBrace => {
                        depth -= 1;
                        self.advance();
                        if depth == 0 {
                            break;
                        }
                    }
                    TokenKind::Eof => break,
                    _ => {
                        self.advance();
                    }
                }
            }
        } else {
            while !self.at_eof()
                && !self.is_word("GROUP")
                && !self.is_word("OBJECT")
                && !self.is_word("MODULE")
                && !self.is_word("STATUS")
                && !self.is_word("DESCRIPTION")
                && !matches!(self.current().kind, TokenKind::Assign)
            {
                self.advance();
            }
        }
    }

    fn parse_agent_capabilities(&mut self, name: Ident) -> Option<Definition> {
        let start = name.range();
        let mut product_release = None;
        let mut status = None;
        let mut description = None;
        let mut reference = None;
        let mut supports = Vec::new();
        loop {
            if self.is_word("PRODUCT-RELEASE") {
                self.advance();
                product_release = self.parse_quoted_string();
            } else if self.is_word("STATUS") {
                self.advance();
                status = self.parse_status();
            } else if self.is_word("DESCRIPTION") {
                self.advance();
                description = self.parse_quoted_string();
            } else if self.is_word("REFERENCE") {
                self.advance();
                reference = self.parse_quoted_string();
            } else if self.is_word("SUPPORTS") {
                self.advance();
                if let Some(module_name) = self.expect_name() {
                    let includes = if self.is_word("INCLUDES") {
                        self.advance();
                        self.parse_name_list()
                    } else {
                        Vec::new()
                    };
                    supports.push(SupportsModuleAst {
                        module_name,
                        includes,
                    });
                }
            } else {
                break;
            }
        }
        if status.is_none() {
            self.missing_clause("status", start);
        }
        if description.is_none() {
            self.missing_clause("description", start);
        }
        self.expect_kind(&TokenKind::Assign);
        let value = self.parse_oid_value()?;
        let range = TextRange::new(start.start(), value.range.end());
        Some(Definition::AgentCapabilities(AgentCapabilitiesAst {
            name,
            product_release,
            status,
            description,
            reference,
            supports,
            value,
            range,
        }))
    }

    fn parse_status(&mut self) -> Option<StatusAst> {
        let Some(name) = self.expect_name() else {
            return None;
        };
        match name.as_str() {
            "current" => Some(StatusAst::Current),
            "deprecated" => Some(StatusAst::Deprecated),
            "obsolete" => Some(StatusAst::Obsolete),
            "mandatory" => Some(StatusAst::Mandatory),
            "optional" => Some(StatusAst::Optional),
            other => {
                self.error_at(
                    "lex-invalid-char",
                    format!("unrecognized STATUS value `{other}`"),
                    name.range().start(),
                );
                None
            }
        }
    }

    fn parse_access(&mut self) -> Option<AccessAst> {
        let Some(name) = self.expect_name() else {
            return None;
        };
        match name.as_str() {
            "not-accessible" => Some(AccessAst::NotAccessible),
            "accessible-for-notify" => Some(AccessAst::AccessibleForNotify),
            "read-only" => Some(AccessAst::ReadOnly),
            "read-write" => Some(AccessAst::ReadWrite),
            "read-create" => Some(AccessAst::ReadCreate),
            "write-only" => {
                self.error_at(
                    codes::ACCESS_LEGACY_WRITE_ONLY,
                    "`write-only` is a legacy SMIv1 access keyword",
                    name.range().start(),
                );
                Some(AccessAst::WriteOnly)
            }
            other => {
                self.error_at(
                    "lex-invalid-char",
                    format!("unrecognized access value `{other}`"),
                    name.range().start(),
                );
                None
            }
        }
    }

    fn parse_quoted_string(&mut self) -> Option<String> {
        if let TokenKind::QuotedString(text) = &self.current().kind {
            let text = text.clone();
            self.advance();
            Some(text)
        } else {
            let range = self.current().range;
            self.error_at(
                "lex-invalid-char",
                format!("expected a quoted string, found `{}`", self.current().kind),
                range.start(),
            );
            None
        }
    }

    fn parse_name_list(&mut self) -> Vec<Ident> {
        let mut names = Vec::new();
        if !self.expect_kind(&TokenKind::LBrace) {
            return names;
        }
        loop {
            if matches!(self.current().kind, TokenKind::RBrace) || self.at_eof() {
                break;
            }
            if let Some(name) = self.expect_name() {
                names.push(name);
            } else {
                break;
            }
            if matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect_kind(&TokenKind::RBrace);
        names
    }

    fn parse_index_clause(&mut self) -> Option<Vec<IndexColumnAst>> {
        if !self.expect_kind(&TokenKind::LBrace) {
            return None;
        }
        let mut columns = Vec::new();
        loop {
            if matches!(self.current().kind, TokenKind::RBrace) || self.at_eof() {
                break;
            }
            let implied = if self.is_word("IMPLIED") {
                self.advance();
                true
            } else {
                false
            };
            if let Some(name) = self.expect_name() {
                columns.push(IndexColumnAst { implied, name });
            } else {
                break;
            }
            if matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect_kind(&TokenKind::RBrace);
        Some(columns)
    }

    fn parse_augments_clause(&mut self) -> Option<Ident> {
        if !self.expect_kind(&TokenKind::LBrace) {
            return None;
        }
        let name = self.expect_name();
        self.expect_kind(&TokenKind::RBrace);
        name
    }

    fn parse_defval_clause(&mut self) -> Option<DefValAst> {
        if !self.expect_kind(&TokenKind::LBrace) {
            return None;
        }
        let value = match &self.current().kind {
            TokenKind::Number(n) => {
                let n = *n;
                self.advance();
                Some(DefValAst::Integer(n))
            }
            TokenKind::QuotedString(_) => self.parse_quoted_string().map(DefValAst::QuotedString),
            TokenKind::HexString(bytes) => {
                let bytes = bytes.clone();
                self.advance();
                Some(DefValAst::Bytes(bytes))
            }
            TokenKind::BinString(bytes) => {
                let bytes = bytes.clone();
                self.advance();
                Some(DefValAst::Bytes(bytes))
            }
            TokenKind::LBrace => {
                // Ambiguous between an OID value and a BITS member list;
                // disambiguate on the first inner token: a bare `Name}` or
                // `Name,` run with no numbers is a BITS list, otherwise OID.
                if self.looks_like_bits_list() {
                    Some(DefValAst::BitsList(self.parse_name_list()))
                } else {
                    self.parse_oid_value().map(DefValAst::Oid)
                }
            }
            TokenKind::Word(_) => self.expect_name().map(DefValAst::Identifier),
            _ => {
                let range = self.current().range;
                self.error_at(
                    "lex-invalid-char",
                    "unrecognized DEFVAL content",
                    range.start(),
                );
                None
            }
        };
        self.expect_kind(&TokenKind::RBrace);
        value
    }

    /// Lookahead heuristic distinguishing `{ name1, name2 }` (BITS list) from
    /// `{ name1 name2 3 }` (OID value): an OID value's components are never
    /// comma-separated.
    fn looks_like_bits_list(&self) -> bool {
        matches!(self.peek_kind(2), TokenKind::Comma | TokenKind::RBrace)
            && matches!(self.peek_kind(1), TokenKind::Word(_))
    }

    fn parse_oid_value(&mut self) -> Option<ObjectIdValueAst> {
        let start = self.current().range;
        if !self.expect_kind(&TokenKind::LBrace) {
            return None;
        }
        let mut components = Vec::new();
        loop {
            if matches!(self.current().kind, TokenKind::RBrace) || self.at_eof() {
                break;
            }
            match &self.current().kind {
                TokenKind::Number(n) => {
                    let n = *n;
                    self.advance();
                    components.push(OidComponent::Number(u32::try_from(n).unwrap_or(0)));
                }
                TokenKind::Word(_) => {
                    let name = self.expect_name()?;
                    if matches!(self.current().kind, TokenKind::LParen) {
                        self.advance();
                        let number_range = self.current().range;
                        let number = match self.current().kind {
                            TokenKind::Number(n) => {
                                self.advance();
                                u32::try_from(n).unwrap_or(0)
                            }
                            _ => {
                                self.error_at(
                                    "lex-invalid-char",
                                    "expected a numeric arc inside `(...)`",
                                    number_range.start(),
                                );
                                0
                            }
                        };
                        self.expect_kind(&TokenKind::RParen);
                        components.push(OidComponent::NamedNumber(name, number));
                    } else {
                        components.push(OidComponent::Name(name));
                    }
                }
                _ => {
                    let range = self.current().range;
                    self.error_at(
                        "lex-invalid-char",
                        format!("unexpected token `{}` in OID value", self.current().kind),
                        range.start(),
                    );
                    self.advance();
                }
            }
        }
        let end = self.current().range;
        self.expect_kind(&TokenKind::RBrace);
        Some(ObjectIdValueAst {
            components,
            range: TextRange::new(start.start(), end.end()),
        })
    }

    /// The type-syntax grammar (spec.md §4.2).
    fn parse_type_syntax(&mut self) -> Option<TypeSyntax> {
        if self.is_word("SEQUENCE") {
            self.advance();
            if self.is_word("OF") {
                self.advance();
                let inner = self.parse_type_syntax()?;
                return Some(TypeSyntax::SequenceOf(Box::new(inner)));
            }
            return self.parse_sequence_fields();
        }
        if self.is_word("CHOICE") {
            self.advance();
            return self.parse_choice_arms();
        }
        if self.is_word("INTEGER") || self.is_word("BITS") {
            let is_bits = self.is_word("BITS");
            self.advance();
            if matches!(self.current().kind, TokenKind::LBrace) {
                let items = self.parse_enum_items();
                return Some(if is_bits {
                    TypeSyntax::Bits(items)
                } else {
                    TypeSyntax::IntegerEnum(items)
                });
            }
            let base = TypeSyntax::Named(Ident::new(
                if is_bits { "BITS" } else { "INTEGER" },
                self.current().range,
            ));
            return self.parse_optional_constraints(base);
        }
        if self.is_word("OCTET") {
            self.advance();
            self.expect_word("STRING");
            let base = TypeSyntax::Named(Ident::new("OCTET STRING", self.current().range));
            return self.parse_optional_constraints(base);
        }
        if self.is_word("OBJECT") {
            self.advance();
            self.expect_word("IDENTIFIER");
            return Some(TypeSyntax::Named(Ident::new(
                "OBJECT IDENTIFIER",
                self.current().range,
            )));
        }
        if let TokenKind::Word(text) = &self.current().kind {
            let text = text.clone();
            if BUILTIN_TYPE_NAMES.contains(&text.as_str()) {
                let range = self.current().range;
                self.advance();
                let ident = Ident::new(text, range);
                return self.parse_optional_constraints(TypeSyntax::Named(ident));
            }
        }
        let name = self.expect_name()?;
        let base = TypeSyntax::Named(name);
        self.parse_optional_constraints(base)
    }

    fn parse_optional_constraints(&mut self, base: TypeSyntax) -> Option<TypeSyntax> {
        let mut size = None;
        let mut value_range = None;
        loop {
            if self.is_word("SIZE") {
                self.advance();
                size = self.parse_constraint_list();
            } else if matches!(self.current().kind, TokenKind::LParen) {
                value_range = self.parse_constraint_list();
            } else {
                break;
            }
        }
        if size.is_none() && value_range.is_none() {
            Some(base)
        } else {
            Some(TypeSyntax::Constrained {
                base: Box::new(base),
                size,
                value_range,
            })
        }
    }

    /// A parenthesized disjunction of ranges: `(0..63)`, `(1 | 4..8 | 16)`.
    fn parse_constraint_list(&mut self) -> Option<ConstraintList> {
        if !self.expect_kind(&TokenKind::LParen) {
            return None;
        }
        let mut ranges = Vec::new();
        loop {
            let min = self.parse_signed_number()?;
            let range = if matches!(self.current().kind, TokenKind::DotDot) {
                self.advance();
                let max = self.parse_signed_number()?;
                ConstraintRange { min, max }
            } else {
                ConstraintRange::single(min)
            };
            ranges.push(range);
            if matches!(self.current().kind, TokenKind::Bar) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect_kind(&TokenKind::RParen);
        Some(ranges)
    }

    fn parse_signed_number(&mut self) -> Option<i64> {
        match self.current().kind {
            TokenKind::Number(n) => {
                self.advance();
                Some(n)
            }
            _ => {
                let range = self.current().range;
                self.error_at(
                    "lex-invalid-char",
                    format!("expected a number, found `{}`", self.current().kind),
                    range.start(),
                );
                None
            }
        }
    }

    fn parse_enum_items(&mut self) -> Vec<EnumItem> {
        let mut items = Vec::new();
        if !self.expect_kind(&TokenKind::LBrace) {
            return items;
        }
        loop {
            if matches!(self.current().kind, TokenKind::RBrace) || self.at_eof() {
                break;
            }
            let Some(name) = self.expect_name() else {
                break;
            };
            if !self.expect_kind(&TokenKind::LParen) {
                break;
            }
            let Some(value) = self.parse_signed_number() else {
                break;
            };
            self.expect_kind(&TokenKind::RParen);
            items.push(EnumItem { name, value });
            if matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect_kind(&TokenKind::RBrace);
        items
    }

    fn parse_sequence_fields(&mut self) -> Option<TypeSyntax> {
        if !self.expect_kind(&TokenKind::LBrace) {
            return None;
        }
        let mut fields = Vec::new();
        loop {
            if matches!(self.current().kind, TokenKind::RBrace) || self.at_eof() {
                break;
            }
            let Some(name) = self.expect_name() else {
                break;
            };
            // Field type references are named or named-with-constraints; we
            // only need the base reference to track row shape.
            let type_name = match self.parse_type_syntax() {
                Some(syntax) => syntax
                    .named_reference()
                    .cloned()
                    .unwrap_or_else(|| Ident::new("Unknown", name.range())),
                None => Ident::new("Unknown", name.range()),
            };
            fields.push(SequenceField { name, type_name });
            if matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect_kind(&TokenKind::RBrace);
        Some(TypeSyntax::Sequence(fields))
    }

    fn parse_choice_arms(&mut self) -> Option<TypeSyntax> {
        if !self.expect_kind(&TokenKind::LBrace) {
            return None;
        }
        let mut arms = Vec::new();
        loop {
            if matches!(self.current().kind, TokenKind::RBrace) || self.at_eof() {
                break;
            }
            let Some(name) = self.expect_name() else {
                break;
            };
            let syntax = self.parse_type_syntax().unwrap_or(TypeSyntax::Named(
                Ident::new("Unknown", name.range()),
            ));
            arms.push((name, syntax));
            if matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect_kind(&TokenKind::RBrace);
        Some(TypeSyntax::Choice(arms))
    }
}

fn is_macro_keyword(word: &str) -> bool {
    matches!(
        word,
        "OBJECT-TYPE"
            | "OBJECT-IDENTITY"
            | "MODULE-IDENTITY"
            | "NOTIFICATION-TYPE"
            | "TRAP-TYPE"
            | "OBJECT-GROUP"
            | "NOTIFICATION-GROUP"
            | "MODULE-COMPLIANCE"
            | "AGENT-CAPABILITIES"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str, strictness: Strictness) -> (Option<ModuleAst>, Vec<Diagnostic>) {
        let config = DiagnosticConfig::from_strictness(strictness);
        parse_module(text, "TEST-MIB", strictness, &config)
    }

    #[test]
    fn parses_minimal_value_assignment_module() {
        let text = "TEST-MIB DEFINITIONS ::= BEGIN\n\
             testObject OBJECT IDENTIFIER ::= { iso 3 }\n\
             END";
        let (module, diagnostics) = parse(text, Strictness::Permissive);
        let module = module.expect("module should parse");
        assert_eq!(module.name.as_str(), "TEST-MIB");
        assert_eq!(module.definitions.len(), 1);
        assert!(diagnostics.iter().all(|d| d.severity.as_u8() >= 2));
    }

    #[test]
    fn parses_imports_clause() {
        let text = "TEST-MIB DEFINITIONS ::= BEGIN\n\
             IMPORTS\n\
                 OBJECT-TYPE, MODULE-IDENTITY FROM SNMPv2-SMI\n\
                 DisplayString FROM SNMPv2-TC;\n\
             testObject OBJECT IDENTIFIER ::= { iso 3 }\n\
             END";
        let (module, _) = parse(text, Strictness::Permissive);
        let module = module.expect("module should parse");
        assert_eq!(module.imports.len(), 2);
        assert_eq!(module.imports[0].symbols.len(), 2);
        assert_eq!(module.imports[0].from_module.as_str(), "SNMPv2-SMI");
    }

    #[test]
    fn parses_object_type_with_index() {
        let text = "TEST-MIB DEFINITIONS ::= BEGIN\n\
             syntheticSimpleIndex OBJECT-TYPE\n\
                 SYNTAX Unsigned32 (1..65535)\n\
                 MAX-ACCESS not-accessible\n\
                 STATUS current\n\
                 DESCRIPTION \"index\"\n\
                 ::= { synthEntry 1 }\n\
             END";
        let (module, diagnostics) = parse(text, Strictness::Permissive);
        let module = module.expect("module should parse");
        let Definition::ObjectType(obj) = &module.definitions[0] else {
            panic!("expected ObjectType");
        };
        assert_eq!(obj.access, Some(AccessAst::NotAccessible));
        assert_eq!(obj.status, Some(StatusAst::Current));
        assert!(matches!(obj.syntax, TypeSyntax::Constrained { .. }));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn parses_trap_type_with_plain_integer_value() {
        let text = "TEST-MIB DEFINITIONS ::= BEGIN\n\
             coldStart TRAP-TYPE\n\
                 ENTERPRISE testEnterprise\n\
                 DESCRIPTION \"cold start\"\n\
                 ::= 0\n\
             END";
        let (module, _) = parse(text, Strictness::Permissive);
        let module = module.expect("module should parse");
        let Definition::TrapType(trap) = &module.definitions[0] else {
            panic!("expected TrapType");
        };
        assert_eq!(trap.enterprise.as_str(), "testEnterprise");
        assert_eq!(trap.specific_trap_number, 0);
    }

    #[test]
    fn missing_clause_severity_follows_strictness() {
        let text = "TEST-MIB DEFINITIONS ::= BEGIN\n\
             testObject OBJECT-TYPE\n\
                 SYNTAX INTEGER\n\
                 ::= { iso 3 }\n\
             END";
        let (_, strict_diags) = parse(text, Strictness::Strict);
        let (_, permissive_diags) = parse(text, Strictness::Permissive);
        let strict_missing = strict_diags
            .iter()
            .find(|d| d.code == "missing-max-access")
            .unwrap();
        let permissive_missing = permissive_diags
            .iter()
            .find(|d| d.code == "missing-max-access")
            .unwrap();
        assert_eq!(strict_missing.severity, smi_diagnostics::Severity::Error);
        assert_eq!(
            permissive_missing.severity,
            smi_diagnostics::Severity::Minor
        );
    }

    #[test]
    fn recovers_from_malformed_definition_and_continues() {
        let text = "TEST-MIB DEFINITIONS ::= BEGIN\n\
             badOne ???\n\
             goodOne OBJECT IDENTIFIER ::= { iso 4 }\n\
             END";
        let (module, diagnostics) = parse(text, Strictness::Permissive);
        let module = module.expect("module should still parse");
        assert_eq!(module.definitions.len(), 1);
        assert_eq!(module.definitions[0].name().as_str(), "goodOne");
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn exports_clause_is_tolerated_and_flagged() {
        let text = "TEST-MIB DEFINITIONS ::= BEGIN\n\
             EXPORTS testObject;\n\
             testObject OBJECT IDENTIFIER ::= { iso 3 }\n\
             END";
        let (module, diagnostics) = parse(text, Strictness::Permissive);
        let module = module.expect("module should parse");
        assert!(module.exports_present);
        assert!(diagnostics
            .iter()
            .any(|d| d.code == codes::EXPORTS_CLAUSE_IGNORED));
    }

    #[test]
    fn parses_hex_defval_for_object_type() {
        let text = "TEST-MIB DEFINITIONS ::= BEGIN\n\
             col OBJECT-TYPE\n\
                 SYNTAX Unsigned32\n\
                 MAX-ACCESS read-only\n\
                 STATUS current\n\
                 DESCRIPTION \"d\"\n\
                 DEFVAL { '00000000'H }\n\
                 ::= { entry 1 }\n\
             END";
        let (module, _) = parse(text, Strictness::Permissive);
        let module = module.expect("module should parse");
        let Definition::ObjectType(obj) = &module.definitions[0] else {
            panic!("expected ObjectType");
        };
        assert_eq!(
            obj.defval,
            Some(DefValAst::Bytes(vec![0, 0, 0, 0]))
        );
    }
}
