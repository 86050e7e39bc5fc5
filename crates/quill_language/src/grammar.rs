//! The script and header grammars.
//!
//! Rules are composed from the combinator core and built once per
//! process into a [`Grammar`] arena; semantic actions attached to the
//! rules assemble the AST on the context's statement stack as matching
//! proceeds. The statement alternation order is load-bearing: it
//! encodes precedence between forms whose heads overlap (`-` is both
//! binary and unary; a send is a syntactic superset of a procedure
//! call).

use crate::ast::{
    ClassDecl, ClassDefDecl, Define, ExportEntry, ExternDecl, Function, GlobalDecl, LValue, Node,
    Procedure, Property, SelectorDecl, Synonym, Value, ValueKind, VariableDecl, VerbHandler,
};
use crate::context::{ParseContext, TokenClass};
use crate::operators::{
    ASSIGNMENT_OPS, AssignmentOperator, BINARY_OPS, BinaryOperator, NARY_ASSOC_OPS,
    NARY_COMPARE_OPS, UNARY_OPS, UnaryOperator,
};
use crate::optrie::OperatorTable;
use crate::primitives::{
    ASM_OPCODES, asm_instruction, asm_label, brace_string, filename, identifier, identifier_any,
    integer, pattern_string, quoted_string, selector, selector_colon, selector_question,
    send_target_name,
};
use crate::rule::{
    Grammar, Rule, RuleId, alt, always, at_least, call, char_token, keyword, matcher, one_or_more,
    operator, opt, sep_by, seq, zero_or_more,
};
use crate::span::Position;
use crate::stream::Stream;
use std::sync::LazyLock;

static BINARY_TABLE: LazyLock<OperatorTable> = LazyLock::new(|| OperatorTable::new(BINARY_OPS));
static NARY_ASSOC_TABLE: LazyLock<OperatorTable> =
    LazyLock::new(|| OperatorTable::new(NARY_ASSOC_OPS));
static NARY_COMPARE_TABLE: LazyLock<OperatorTable> =
    LazyLock::new(|| OperatorTable::new(NARY_COMPARE_OPS));
static UNARY_TABLE: LazyLock<OperatorTable> = LazyLock::new(|| OperatorTable::new(UNARY_OPS));
static ASSIGNMENT_TABLE: LazyLock<OperatorTable> =
    LazyLock::new(|| OperatorTable::new(ASSIGNMENT_OPS));

/// The built grammar with its two entry points.
pub struct ScriptGrammar {
    grammar: Grammar,
    entire_script: RuleId,
    entire_header: RuleId,
}

impl ScriptGrammar {
    /// Runs the full-script entry point.
    pub fn parse_script(&self, ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
        self.grammar.parse(self.entire_script, ctx, stream)
    }

    /// Runs the header entry point.
    pub fn parse_header(&self, ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
        self.grammar.parse(self.entire_header, ctx, stream)
    }
}

static GRAMMAR: LazyLock<ScriptGrammar> = LazyLock::new(build);

/// The process-wide grammar, built on first use.
#[must_use]
pub fn script_grammar() -> &'static ScriptGrammar {
    &GRAMMAR
}

/// Wraps a rule so it builds exactly one AST node: a slot is opened
/// before matching and handed off (or discarded) after.
fn node(rule: Rule) -> Rule {
    seq(vec![always().act(a_start_statement), rule]).act(a_finish_statement)
}

fn build() -> ScriptGrammar {
    let mut g = Grammar::new();
    let st = g.declare();

    // ---- values ---------------------------------------------------

    let variable_ref = g.add(alt(vec![
        seq(vec![
            char_token('['),
            matcher(identifier).act(a_err_word).act(a_value_token),
            call(st).act(a_err_expression).act(a_bind_value_indexer),
            char_token(']'),
        ]),
        matcher(identifier).act(a_value_token).classify(TokenClass::Value),
    ]));

    let value = g.add(node(alt(vec![
        matcher(integer).act(a_value_number),
        keyword("argc").act(a_value_argc),
        matcher(quoted_string).act(a_value_string),
        matcher(brace_string).act(a_value_string),
        matcher(pattern_string).act(a_value_said),
        seq(vec![
            char_token('#'),
            matcher(selector).act(a_err_word).act(a_value_selector),
        ]),
        seq(vec![
            keyword("&sizeof"),
            matcher(identifier).act(a_err_word).act(a_value_sizeof),
        ]),
        seq(vec![
            opt(char_token('@').act(a_mark_pointer)),
            call(variable_ref),
        ]),
    ])));

    // A complex property value, for declaration positions. Writes the
    // property-value register rather than building a statement node.
    let prop_value = g.add(alt(vec![
        matcher(integer).act(a_pv_number),
        matcher(quoted_string).act(a_pv_string),
        matcher(brace_string).act(a_pv_string),
        matcher(pattern_string).act(a_pv_said),
        seq(vec![
            char_token('#'),
            matcher(selector).act(a_err_word).act(a_pv_selector),
        ]),
        matcher(identifier).act(a_pv_token),
    ]));

    // ---- lvalues --------------------------------------------------

    let lvalue = g.add(node(alt(vec![
        seq(vec![
            char_token('['),
            matcher(identifier).act(a_err_word).act(a_set_lvalue),
            call(st).act(a_err_expression).act(a_bind_lvalue_indexer),
            char_token(']'),
        ]),
        matcher(identifier).act(a_set_lvalue),
    ])));

    // ---- operator expressions -------------------------------------

    let assignment = node(seq(vec![
        char_token('('),
        operator(LazyLock::force(&ASSIGNMENT_TABLE)).act(a_set_assignment),
        call(lvalue).act(a_bind_assignment_target),
        call(st).act(a_err_expression).act(a_add_statement),
        char_token(')'),
    ]));

    let binary_operation = node(seq(vec![
        char_token('('),
        operator(LazyLock::force(&BINARY_TABLE)).act(a_set_nary),
        call(st).act(a_err_expression).act(a_add_statement),
        call(st).act(a_err_expression).act(a_add_statement),
        char_token(')').act(a_finalize_binary),
    ]));

    let unary_operation = node(seq(vec![
        char_token('('),
        operator(LazyLock::force(&UNARY_TABLE)).act(a_set_unary),
        call(st).act(a_err_expression).act(a_add_statement),
        char_token(')'),
    ]));

    let nary_assoc = node(seq(vec![
        char_token('('),
        operator(LazyLock::force(&NARY_ASSOC_TABLE)).act(a_set_nary),
        at_least(2, call(st).act(a_add_statement)),
        char_token(')').act(a_restructure_associative),
    ]));

    let nary_compare = node(seq(vec![
        char_token('('),
        operator(LazyLock::force(&NARY_COMPARE_TABLE)).act(a_set_nary),
        at_least(2, call(st).act(a_add_statement)),
        char_token(')').act(a_finalize_compare),
    ]));

    // ---- control flow ---------------------------------------------

    let code_block = g.add(node(seq(vec![
        char_token('('),
        always().act(a_set_code_block),
        zero_or_more(call(st).act(a_add_statement)),
        char_token(')'),
    ])));

    let return_ = node(seq(vec![
        char_token('('),
        keyword("return").classify(TokenClass::Keyword).act(a_set_return),
        opt(call(st).act(a_add_statement)),
        char_token(')'),
    ]));

    let else_clause = seq(vec![
        keyword("else").act(a_open_else),
        zero_or_more(call(st).act(a_add_statement)),
    ]);

    let if_ = node(seq(vec![
        char_token('('),
        keyword("if").classify(TokenClass::Keyword).act(a_set_if),
        call(st).act(a_err_expression).act(a_bind_condition),
        zero_or_more(call(st).act(a_add_statement)),
        opt(else_clause),
        char_token(')'),
    ]));

    let while_ = node(seq(vec![
        char_token('('),
        keyword("while").classify(TokenClass::Keyword).act(a_set_while),
        call(st).act(a_err_expression).act(a_bind_condition),
        zero_or_more(call(st).act(a_add_statement)),
        char_token(')'),
    ]));

    let repeat_ = node(seq(vec![
        char_token('('),
        keyword("repeat").classify(TokenClass::Keyword).act(a_set_repeat),
        zero_or_more(call(st).act(a_add_statement)),
        char_token(')'),
    ]));

    let for_ = node(seq(vec![
        char_token('('),
        keyword("for").classify(TokenClass::Keyword).act(a_set_for),
        call(code_block).act(a_bind_for_init),
        call(st).act(a_err_expression).act(a_bind_condition),
        call(code_block).act(a_bind_for_step),
        zero_or_more(call(st).act(a_add_statement)),
        char_token(')'),
    ]));

    let foreach_ = node(seq(vec![
        char_token('('),
        keyword("foreach").classify(TokenClass::Keyword).act(a_set_foreach),
        opt(char_token('&').act(a_mark_by_reference)),
        matcher(identifier).act(a_err_word).act(a_set_foreach_variable),
        call(st).act(a_err_expression).act(a_bind_foreach_collection),
        zero_or_more(call(st).act(a_add_statement)),
        char_token(')'),
    ]));

    // A case clause of a switch or cond: `(value stmts…)` or
    // `(else stmts…)`.
    let case_clause = g.add(node(seq(vec![
        char_token('('),
        always().act(a_set_case),
        alt(vec![
            keyword("else").act(a_mark_default),
            call(st).act(a_bind_case_value),
        ])
        .act(a_err_case),
        zero_or_more(call(st).act(a_add_statement)),
        char_token(')'),
    ])));

    // A switchto case carries no value; numbering happens later.
    let switchto_case = g.add(node(seq(vec![
        char_token('('),
        always().act(a_set_case),
        opt(keyword("else").act(a_mark_default)),
        zero_or_more(call(st).act(a_add_statement)),
        char_token(')'),
    ])));

    let switch_ = node(seq(vec![
        char_token('('),
        keyword("switch").classify(TokenClass::Keyword).act(a_set_switch),
        call(st).act(a_err_expression).act(a_bind_switch_value),
        zero_or_more(call(case_clause).act(a_add_statement)),
        char_token(')'),
    ]));

    let switchto = node(seq(vec![
        char_token('('),
        keyword("switchto").classify(TokenClass::Keyword).act(a_set_switchto),
        call(st).act(a_err_expression).act(a_bind_switch_value),
        zero_or_more(call(switchto_case).act(a_add_statement)),
        char_token(')'),
    ]));

    let cond = node(seq(vec![
        char_token('('),
        keyword("cond").classify(TokenClass::Keyword).act(a_set_cond),
        one_or_more(call(case_clause).act(a_add_statement)),
        char_token(')'),
    ]));

    let break_ = node(seq(vec![
        char_token('('),
        keyword("break").classify(TokenClass::Keyword).act(a_set_break),
        opt(matcher(nonzero_integer).act(a_err_nonzero).act(a_set_loop_levels)),
        char_token(')'),
    ]));

    let continue_ = node(seq(vec![
        char_token('('),
        keyword("continue").classify(TokenClass::Keyword).act(a_set_continue),
        opt(matcher(nonzero_integer).act(a_err_nonzero).act(a_set_loop_levels)),
        char_token(')'),
    ]));

    let breakif = node(seq(vec![
        char_token('('),
        keyword("breakif").classify(TokenClass::Keyword).act(a_set_breakif),
        call(st).act(a_err_expression).act(a_bind_condition),
        opt(matcher(nonzero_integer).act(a_err_nonzero).act(a_set_loop_levels)),
        char_token(')'),
    ]));

    let contif = node(seq(vec![
        char_token('('),
        keyword("contif").classify(TokenClass::Keyword).act(a_set_contif),
        call(st).act(a_err_expression).act(a_bind_condition),
        opt(matcher(nonzero_integer).act(a_err_nonzero).act(a_set_loop_levels)),
        char_token(')'),
    ]));

    // ---- asm ------------------------------------------------------

    let asm_statement = g.add(node(seq(vec![
        always().act(a_set_asm_statement),
        opt(matcher(asm_label).act(a_set_asm_label)),
        matcher(asm_instruction).act(a_set_asm_opcode),
        sep_by(call(st).act(a_add_statement), char_token(',')),
    ])));

    // The exclusion set must be cleared whether the block completes or
    // not, but only once the `asm` keyword has actually been seen.
    let asm_block = node(seq(vec![
        char_token('('),
        keyword("asm").classify(TokenClass::Keyword).act(a_set_asm),
        seq(vec![
            one_or_more(call(asm_statement).act(a_add_statement)),
            char_token(')'),
        ])
        .act(a_clear_asm_keywords),
    ]));

    // ---- sends and calls ------------------------------------------

    let send_clause = g.add(node(alt(vec![
        seq(vec![
            matcher(selector_colon).classify(TokenClass::Selector).act(a_set_send_param),
            zero_or_more(call(st).act(a_add_statement)),
        ]),
        matcher(selector_question)
            .classify(TokenClass::Selector)
            .act(a_set_property_read),
    ])));

    let send_target = alt(vec![
        matcher(send_target_name).act(a_bind_send_target_name),
        call(st).act(a_bind_send_target_statement),
    ]);

    let send_call = node(seq(vec![
        char_token('('),
        always().act(a_set_send),
        send_target,
        one_or_more(seq(vec![
            call(send_clause).act(a_add_statement),
            opt(char_token(',')),
        ])),
        char_token(')'),
    ]));

    let procedure_call = node(seq(vec![
        char_token('('),
        matcher(identifier).act(a_set_procedure_call),
        zero_or_more(call(st).act(a_add_statement)),
        char_token(')'),
    ]));

    let rest_ = node(seq(vec![
        keyword("&rest").act(a_set_rest),
        opt(matcher(identifier).act(a_bind_rest_parameter)),
    ]));

    // ---- the statement alternation --------------------------------

    g.define(
        st,
        alt(vec![
            assignment,
            binary_operation,
            unary_operation,
            nary_assoc,
            nary_compare,
            return_,
            if_,
            while_,
            for_,
            foreach_,
            repeat_,
            cond,
            switchto,
            switch_,
            breakif,
            break_,
            continue_,
            contif,
            asm_block,
            send_call,
            procedure_call,
            rest_,
            call(value),
        ]),
    );

    // ---- declarations ---------------------------------------------

    // `[name size]` or a bare name; used for locals, temps, globals.
    let var_target = |commit_needed: bool| {
        let body = alt(vec![
            seq(vec![
                char_token('['),
                matcher(identifier).act(a_err_word).act(a_begin_var_decl),
                matcher(array_size).act(a_err_array_size).act(a_set_var_size),
                char_token(']'),
            ]),
            matcher(identifier).act(a_begin_var_decl),
        ]);
        // Temps take no initializers.
        if commit_needed {
            body
        } else {
            seq(vec![
                body,
                opt(seq(vec![
                    char_token('='),
                    alt(vec![
                        seq(vec![
                            char_token('['),
                            zero_or_more(call(prop_value).act(a_add_var_initializer)),
                            char_token(']'),
                        ]),
                        call(prop_value).act(a_add_var_initializer),
                    ]),
                ])),
            ])
        }
    };

    let tmp_section = seq(vec![
        keyword("&tmp"),
        one_or_more(var_target(true).act(a_commit_temp)),
    ]);

    // `(name params… &tmp …)` shared by procedures and methods.
    let function_header = seq(vec![
        char_token('('),
        matcher(identifier).act(a_err_word).act(a_begin_function),
        zero_or_more(matcher(identifier).act(a_add_parameter)),
        opt(tmp_section),
        char_token(')'),
    ]);

    let function_body = zero_or_more(call(st).act(a_add_function_statement));

    let procedure_def = seq(vec![
        char_token('('),
        keyword("procedure").classify(TokenClass::Keyword),
        function_header,
        function_body,
        char_token(')'),
    ]);

    let procedure_decl = procedure_def.act(a_commit_procedure);

    let procedure_forward = seq(vec![
        char_token('('),
        keyword("procedure"),
        one_or_more(matcher(identifier).act(a_add_procedure_forward)),
        char_token(')'),
    ]);

    let method_def = seq(vec![
        char_token('('),
        keyword("method").classify(TokenClass::Keyword),
        seq(vec![
            char_token('('),
            matcher(identifier).act(a_err_method).act(a_begin_function),
            zero_or_more(matcher(identifier).act(a_add_parameter)),
            opt(seq(vec![
                keyword("&tmp"),
                one_or_more(alt(vec![
                    seq(vec![
                        char_token('['),
                        matcher(identifier).act(a_err_word).act(a_begin_var_decl),
                        matcher(array_size).act(a_err_array_size).act(a_set_var_size),
                        char_token(']'),
                    ]),
                    matcher(identifier).act(a_begin_var_decl),
                ])
                .act(a_commit_temp)),
            ])),
            char_token(')'),
        ]),
        zero_or_more(call(st).act(a_add_function_statement)),
        char_token(')'),
    ])
    .act(a_commit_method);

    let class_procedure = seq(vec![
        char_token('('),
        keyword("procedure"),
        seq(vec![
            char_token('('),
            matcher(identifier).act(a_err_word).act(a_begin_function),
            zero_or_more(matcher(identifier).act(a_add_parameter)),
            char_token(')'),
        ]),
        zero_or_more(call(st).act(a_add_function_statement)),
        char_token(')'),
    ])
    .act(a_commit_class_procedure);

    let properties_block = seq(vec![
        char_token('('),
        keyword("properties").classify(TokenClass::Keyword),
        zero_or_more(
            seq(vec![
                matcher(selector).classify(TokenClass::Selector).act(a_save_name),
                call(prop_value),
            ])
            .act(a_commit_property),
        ),
        char_token(')'),
    ]);

    let methods_forward = seq(vec![
        char_token('('),
        keyword("methods"),
        one_or_more(matcher(selector).act(a_add_method_forward)),
        char_token(')'),
    ]);

    let verb_clause = g.add(node(seq(vec![
        char_token('('),
        always().act(a_set_verb_clause),
        one_or_more(matcher(identifier).act(a_add_verb_name)),
        zero_or_more(call(st).act(a_add_statement)),
        char_token(')'),
    ])));

    let verbs_block = seq(vec![
        char_token('('),
        keyword("verbs").classify(TokenClass::Keyword),
        one_or_more(seq(vec![
            call(verb_clause).act(a_commit_verb_clause),
            opt(char_token(',')),
        ])),
        char_token(')'),
    ]);

    let class_section = alt(vec![
        properties_block,
        method_def,
        methods_forward,
        verbs_block,
        class_procedure,
    ]);

    let class_body = seq(vec![
        matcher(identifier).act(a_err_word).act(a_set_class_name),
        opt(seq(vec![
            alt(vec![keyword("of"), keyword("kindof")]),
            matcher(identifier)
                .act(a_err_word)
                .classify(TokenClass::ClassName)
                .act(a_set_superclass),
        ])),
        zero_or_more(class_section),
        char_token(')'),
    ]);

    let class_decl = seq(vec![
        char_token('('),
        keyword("class").classify(TokenClass::Keyword).act(a_begin_class),
        class_body,
    ])
    .act(a_commit_class);

    let instance_decl = seq(vec![
        char_token('('),
        keyword("instance").classify(TokenClass::Keyword).act(a_begin_instance),
        seq(vec![
            matcher(identifier).act(a_err_word).act(a_set_class_name),
            opt(seq(vec![
                alt(vec![keyword("of"), keyword("kindof")]),
                matcher(identifier)
                    .act(a_err_word)
                    .classify(TokenClass::ClassName)
                    .act(a_set_superclass),
            ])),
            zero_or_more(alt(vec![
                seq(vec![
                    char_token('('),
                    keyword("properties"),
                    zero_or_more(
                        seq(vec![matcher(selector).act(a_save_name), call(prop_value)])
                            .act(a_commit_property),
                    ),
                    char_token(')'),
                ]),
                method_def_for_instance(st, prop_value),
                verbs_block_for_instance(st, verb_clause),
            ])),
            char_token(')'),
        ]),
    ])
    .act(a_commit_class);

    // ---- top-level items ------------------------------------------

    let include = seq(vec![
        char_token('('),
        keyword("include"),
        alt(vec![matcher(quoted_string), matcher(filename)]).act(a_add_include),
        char_token(')'),
    ]);

    let use_ = seq(vec![
        char_token('('),
        keyword("use"),
        alt(vec![matcher(quoted_string), matcher(filename)]).act(a_add_use),
        char_token(')'),
    ]);

    let script_num = seq(vec![
        char_token('('),
        keyword("script#"),
        alt(vec![
            matcher(integer).act(a_set_script_number),
            matcher(identifier).act(a_set_script_number_define),
        ])
        .act(a_err_integer),
        char_token(')'),
    ]);

    let text_num = seq(vec![
        char_token('('),
        keyword("text#"),
        matcher(integer).act(a_err_integer).act(a_set_text_number),
        char_token(')'),
    ]);

    let define_ = seq(vec![
        char_token('('),
        keyword("define").classify(TokenClass::Keyword).act(a_begin_define),
        matcher(identifier).act(a_err_word).act(a_set_define_name),
        matcher(integer).act(a_err_integer).act(a_set_define_value),
        char_token(')'),
    ])
    .act(a_commit_define);

    let enum_ = seq(vec![
        char_token('('),
        keyword("enum").classify(TokenClass::Keyword).act(a_reset_enum),
        opt(matcher(integer).act(a_set_enum_base)),
        zero_or_more(matcher(identifier).act(a_add_enum_member)),
        char_token(')'),
    ]);

    let local_ = seq(vec![
        char_token('('),
        keyword("local").classify(TokenClass::Keyword),
        zero_or_more(var_target(false).act(a_commit_script_variable)),
        char_token(')'),
    ]);

    let synonyms_ = seq(vec![
        char_token('('),
        keyword("synonyms"),
        zero_or_more(
            seq(vec![
                char_token('('),
                matcher(selector).act(a_err_word).act(a_begin_synonym),
                one_or_more(matcher(selector).act(a_add_synonym_word)),
                char_token(')'),
            ])
            .act(a_commit_synonym),
        ),
        char_token(')'),
    ]);

    let public_ = seq(vec![
        char_token('('),
        keyword("public"),
        zero_or_more(
            seq(vec![
                matcher(identifier).act(a_err_word).act(a_save_name),
                matcher(integer).act(a_err_integer),
            ])
            .act(a_commit_export),
        ),
        char_token(')'),
    ]);

    let extern_ = seq(vec![
        char_token('('),
        keyword("extern"),
        zero_or_more(
            seq(vec![
                matcher(identifier).act(a_err_word).act(a_save_name),
                call(prop_value),
                matcher(integer).act(a_err_integer),
            ])
            .act(a_commit_extern),
        ),
        char_token(')'),
    ]);

    let global_ = seq(vec![
        char_token('('),
        keyword("global"),
        zero_or_more(
            seq(vec![
                alt(vec![
                    seq(vec![
                        char_token('['),
                        matcher(identifier).act(a_err_word).act(a_begin_var_decl),
                        matcher(array_size).act(a_err_array_size).act(a_set_var_size),
                        char_token(']'),
                    ]),
                    matcher(identifier).act(a_begin_var_decl),
                ]),
                matcher(integer).act(a_err_integer),
                opt(seq(vec![
                    char_token('='),
                    call(prop_value).act(a_add_var_initializer),
                ])),
            ])
            .act(a_commit_global),
        ),
        char_token(')'),
    ]);

    let selectors_ = seq(vec![
        char_token('('),
        keyword("selectors"),
        zero_or_more(
            seq(vec![
                matcher(selector).act(a_err_word).act(a_save_name),
                matcher(integer).act(a_err_integer),
            ])
            .act(a_commit_selector),
        ),
        char_token(')'),
    ]);

    let classdef_entry = alt(vec![
        seq(vec![keyword("script#"), matcher(integer)]),
        seq(vec![keyword("class#"), matcher(integer)]),
        seq(vec![keyword("super#"), matcher(integer)]),
        seq(vec![
            keyword("file#"),
            alt(vec![matcher(quoted_string), matcher(filename)]),
        ]),
        seq(vec![
            char_token('('),
            keyword("properties"),
            zero_or_more(seq(vec![matcher(selector), matcher(integer)])),
            char_token(')'),
        ]),
        seq(vec![
            char_token('('),
            keyword("methods"),
            zero_or_more(matcher(selector)),
            char_token(')'),
        ]),
    ]);

    let classdef_ = seq(vec![
        char_token('('),
        keyword("classdef"),
        matcher(identifier).act(a_err_word).act(a_commit_classdef),
        zero_or_more(classdef_entry),
        char_token(')'),
    ]);

    let toplevel = alt(vec![
        include,
        use_,
        script_num,
        text_num,
        define_,
        enum_,
        local_,
        synonyms_,
        public_,
        procedure_decl,
        procedure_forward,
        class_decl,
        instance_decl,
        extern_,
        global_,
        selectors_,
        classdef_,
    ]);

    let entire_script = g.add(seq(vec![
        zero_or_more(toplevel),
        matcher(end_of_input).act(a_err_top),
    ]));

    // ---- header entry point ---------------------------------------

    let ifdef = seq(vec![
        keyword("#ifdef"),
        matcher(identifier_any).act(a_err_word).act(a_enter_ifdef),
    ]);
    let endif = keyword("#endif").act(a_exit_ifdef);

    let header_define = seq(vec![
        char_token('('),
        keyword("define").act(a_begin_define),
        matcher(identifier).act(a_err_word).act(a_set_define_name),
        matcher(integer).act(a_err_integer).act(a_set_define_value),
        char_token(')'),
    ])
    .act(a_commit_define);

    let header_enum = seq(vec![
        char_token('('),
        keyword("enum").act(a_reset_enum),
        opt(matcher(integer).act(a_set_enum_base)),
        zero_or_more(matcher(identifier).act(a_add_enum_member)),
        char_token(')'),
    ]);

    let header_include = seq(vec![
        char_token('('),
        keyword("include"),
        alt(vec![matcher(quoted_string), matcher(filename)]).act(a_add_include),
        char_token(')'),
    ]);

    let header_selectors = seq(vec![
        char_token('('),
        keyword("selectors"),
        zero_or_more(
            seq(vec![
                matcher(selector).act(a_err_word).act(a_save_name),
                matcher(integer).act(a_err_integer),
            ])
            .act(a_commit_selector),
        ),
        char_token(')'),
    ]);

    let header_forward = seq(vec![
        char_token('('),
        keyword("procedure"),
        one_or_more(matcher(identifier).act(a_add_procedure_forward)),
        char_token(')'),
    ]);

    let entire_header = g.add(seq(vec![
        zero_or_more(alt(vec![
            ifdef,
            endif,
            header_include,
            header_define,
            header_enum,
            header_selectors,
            header_forward,
        ])),
        matcher(end_of_input).act(a_err_top),
    ]));

    ScriptGrammar {
        grammar: g,
        entire_script,
        entire_header,
    }
}

// Instances share the method and verbs shapes with classes; these are
// split out only to keep `build` readable.
fn method_def_for_instance(st: RuleId, _prop_value: RuleId) -> Rule {
    seq(vec![
        char_token('('),
        keyword("method"),
        seq(vec![
            char_token('('),
            matcher(identifier).act(a_err_method).act(a_begin_function),
            zero_or_more(matcher(identifier).act(a_add_parameter)),
            char_token(')'),
        ]),
        zero_or_more(call(st).act(a_add_function_statement)),
        char_token(')'),
    ])
    .act(a_commit_method)
}

fn verbs_block_for_instance(_st: RuleId, verb_clause: RuleId) -> Rule {
    seq(vec![
        char_token('('),
        keyword("verbs"),
        one_or_more(seq(vec![
            call(verb_clause).act(a_commit_verb_clause),
            opt(char_token(',')),
        ])),
        char_token(')'),
    ])
}

// ---- matcher helpers ----------------------------------------------

fn end_of_input(_ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    stream.skip_ws();
    stream.at_end()
}

fn nonzero_integer(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    integer(ctx, stream) && ctx.integer != 0
}

/// An array size: a literal integer or a previously parsed define.
fn array_size(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    if integer(ctx, stream) {
        return true;
    }
    if identifier(ctx, stream) {
        if let Some(value) = ctx.script.define_value(&ctx.scratch) {
            ctx.integer = value;
            return true;
        }
    }
    false
}

// ---- generic node-stack actions -----------------------------------

fn a_start_statement(ctx: &mut ParseContext<'_>, _ok: bool, _s: &Stream<'_>) {
    ctx.pointer_pending = false;
    ctx.start_statement();
}

fn a_finish_statement(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    ctx.finish_statement(ok);
}

fn null_node(pos: Position) -> Box<Node> {
    Box::new(Node::Value(Value::number(0, pos)))
}

/// Appends the completed statement to whatever node is open. Each
/// variant knows its one growing edge; `If` grows the else branch once
/// it is open.
fn attach(ctx: &mut ParseContext<'_>, node: Node) {
    match ctx.statement() {
        Some(
            Node::CodeBlock { body, .. }
            | Node::While { body, .. }
            | Node::For { body, .. }
            | Node::ForEach { body, .. }
            | Node::Asm { body, .. }
            | Node::Case { body, .. }
            | Node::VerbClause { body, .. },
        ) => body.push(node),
        Some(Node::If {
            then_branch,
            else_branch,
            ..
        }) => match else_branch {
            Some(els) => els.push(node),
            None => then_branch.push(node),
        },
        Some(Node::Switch { cases, .. }) => cases.push(node),
        Some(Node::Cond { clauses, .. }) => clauses.push(node),
        Some(Node::Return { value, .. }) => *value = Some(Box::new(node)),
        Some(Node::Assignment { value, .. }) => *value = Box::new(node),
        Some(Node::UnaryOp { operand, .. }) => *operand = Box::new(node),
        Some(Node::NaryOp { operands, .. }) => operands.push(node),
        Some(Node::SendCall { params, .. }) => params.push(node),
        Some(Node::SendParam { args, .. }) => args.push(node),
        Some(Node::ProcedureCall { args, .. }) => args.push(node),
        Some(Node::AsmStatement { operands, .. }) => operands.push(node),
        _ => {}
    }
}

fn a_add_statement(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        if let Some(node) = ctx.take_result() {
            attach(ctx, node);
        }
    }
}

fn a_bind_condition(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if !ok {
        return;
    }
    let Some(node) = ctx.take_result() else { return };
    match ctx.statement() {
        Some(
            Node::If { condition, .. }
            | Node::While { condition, .. }
            | Node::For { condition, .. },
        ) => *condition = Box::new(node),
        _ => {}
    }
}

// ---- control-flow actions -----------------------------------------

fn a_set_if(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let pos = s.position();
        ctx.set_statement(Node::If {
            condition: null_node(pos),
            then_branch: Vec::new(),
            else_branch: None,
            pos,
        });
    }
}

fn a_open_else(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        if let Some(Node::If { else_branch, .. }) = ctx.statement() {
            *else_branch = Some(Vec::new());
        }
    }
}

fn a_set_while(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let pos = s.position();
        ctx.set_statement(Node::While {
            condition: null_node(pos),
            body: Vec::new(),
            pos,
        });
    }
}

fn a_set_repeat(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let pos = s.position();
        // repeat is sugar for while TRUE.
        ctx.set_statement(Node::While {
            condition: Box::new(Node::Value(Value::number(1, pos))),
            body: Vec::new(),
            pos,
        });
    }
}

fn a_set_for(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let pos = s.position();
        ctx.set_statement(Node::For {
            init: Vec::new(),
            condition: null_node(pos),
            step: Vec::new(),
            body: Vec::new(),
            pos,
        });
    }
}

fn a_bind_for_init(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if !ok {
        return;
    }
    if let Some(Node::CodeBlock { body, .. }) = ctx.take_result() {
        if let Some(Node::For { init, .. }) = ctx.statement() {
            *init = body;
        }
    }
}

fn a_bind_for_step(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if !ok {
        return;
    }
    if let Some(Node::CodeBlock { body, .. }) = ctx.take_result() {
        if let Some(Node::For { step, .. }) = ctx.statement() {
            *step = body;
        }
    }
}

fn a_set_foreach(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let pos = s.position();
        ctx.set_statement(Node::ForEach {
            variable: String::new(),
            by_reference: false,
            collection: null_node(pos),
            body: Vec::new(),
            pos,
        });
    }
}

fn a_mark_by_reference(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        if let Some(Node::ForEach { by_reference, .. }) = ctx.statement() {
            *by_reference = true;
        }
    }
}

fn a_set_foreach_variable(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        if let Some(Node::ForEach { variable, .. }) = ctx.statement() {
            *variable = name;
        }
    }
}

fn a_bind_foreach_collection(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if !ok {
        return;
    }
    let Some(node) = ctx.take_result() else { return };
    if let Some(Node::ForEach { collection, .. }) = ctx.statement() {
        *collection = Box::new(node);
    }
}

fn a_set_switch(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let pos = s.position();
        ctx.set_statement(Node::Switch {
            value: null_node(pos),
            cases: Vec::new(),
            auto_number: false,
            pos,
        });
    }
}

fn a_set_switchto(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let pos = s.position();
        ctx.set_statement(Node::Switch {
            value: null_node(pos),
            cases: Vec::new(),
            auto_number: true,
            pos,
        });
    }
}

fn a_bind_switch_value(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if !ok {
        return;
    }
    let Some(node) = ctx.take_result() else { return };
    if let Some(Node::Switch { value, .. }) = ctx.statement() {
        *value = Box::new(node);
    }
}

fn a_set_cond(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.set_statement(Node::Cond {
            clauses: Vec::new(),
            pos: s.position(),
        });
    }
}

fn a_set_case(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.set_statement(Node::Case {
            value: None,
            is_default: false,
            body: Vec::new(),
            pos: s.position(),
        });
    }
}

fn a_mark_default(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        if let Some(Node::Case { is_default, .. }) = ctx.statement() {
            *is_default = true;
        }
    }
}

fn a_bind_case_value(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if !ok {
        return;
    }
    let Some(node) = ctx.take_result() else { return };
    if let Some(Node::Case { value, .. }) = ctx.statement() {
        *value = Some(Box::new(node));
    }
}

fn a_set_return(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.set_statement(Node::Return {
            value: None,
            pos: s.position(),
        });
    }
}

fn a_set_break(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.set_statement(Node::Break {
            levels: 1,
            pos: s.position(),
        });
    }
}

fn a_set_continue(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.set_statement(Node::Continue {
            levels: 1,
            pos: s.position(),
        });
    }
}

fn a_set_breakif(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let pos = s.position();
        ctx.set_statement(Node::If {
            condition: null_node(pos),
            then_branch: vec![Node::Break { levels: 1, pos }],
            else_branch: None,
            pos,
        });
    }
}

fn a_set_contif(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let pos = s.position();
        ctx.set_statement(Node::If {
            condition: null_node(pos),
            then_branch: vec![Node::Continue { levels: 1, pos }],
            else_branch: None,
            pos,
        });
    }
}

/// Applies a level count to a bare break/continue or to the one nested
/// inside a breakif/contif.
fn a_set_loop_levels(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if !ok {
        return;
    }
    let count = ctx.integer;
    match ctx.statement() {
        Some(Node::Break { levels, .. } | Node::Continue { levels, .. }) => *levels = count,
        Some(Node::If { then_branch, .. }) => {
            if let Some(Node::Break { levels, .. } | Node::Continue { levels, .. }) =
                then_branch.first_mut()
            {
                *levels = count;
            }
        }
        _ => {}
    }
}

fn a_set_code_block(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.set_statement(Node::CodeBlock {
            body: Vec::new(),
            pos: s.position(),
        });
    }
}

// ---- operator actions ---------------------------------------------

fn a_set_assignment(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if !ok {
        return;
    }
    let Some(operator) = AssignmentOperator::from_name(&ctx.scratch) else {
        return;
    };
    let pos = s.position();
    ctx.set_statement(Node::Assignment {
        operator,
        target: LValue::new("", pos),
        value: null_node(pos),
        pos,
    });
}

fn a_bind_assignment_target(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if !ok {
        return;
    }
    if let Some(Node::LValue(lv)) = ctx.take_result() {
        if let Some(Node::Assignment { target, .. }) = ctx.statement() {
            *target = lv;
        }
    }
}

fn a_set_nary(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if !ok {
        return;
    }
    let Some(operator) = BinaryOperator::from_name(&ctx.scratch) else {
        return;
    };
    ctx.set_statement(Node::NaryOp {
        operator,
        operands: Vec::new(),
        pos: s.position(),
    });
}

fn a_set_unary(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if !ok {
        return;
    }
    let Some(operator) = UnaryOperator::from_name(&ctx.scratch) else {
        return;
    };
    let pos = s.position();
    ctx.set_statement(Node::UnaryOp {
        operator,
        operand: null_node(pos),
        pos,
    });
}

/// A binary rule parses as an n-ary with exactly two operands; collapse
/// it.
fn a_finalize_binary(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        collapse_nary(ctx, false);
    }
}

/// Left-fold an associative n-ary into a binary chain:
/// `(+ a b c)` becomes `(+ (+ a b) c)`.
fn a_restructure_associative(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        collapse_nary(ctx, true);
    }
}

/// Two-operand comparisons collapse to binary; longer ones stay n-ary
/// for the desugaring pass.
fn a_finalize_compare(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if !ok {
        return;
    }
    let is_pair = matches!(
        ctx.statement(),
        Some(Node::NaryOp { operands, .. }) if operands.len() == 2
    );
    if is_pair {
        collapse_nary(ctx, false);
    }
}

fn collapse_nary(ctx: &mut ParseContext<'_>, fold_all: bool) {
    let Some(slot) = ctx.statement() else { return };
    let folded = match &mut *slot {
        Node::NaryOp {
            operator,
            operands,
            pos,
        } if operands.len() == 2 || (fold_all && operands.len() > 2) => {
            let operator = *operator;
            let pos = *pos;
            let mut iter = std::mem::take(operands).into_iter();
            let mut acc = iter
                .next()
                .unwrap_or_else(|| Node::Value(Value::number(0, pos)));
            for next in iter {
                acc = Node::BinaryOp {
                    operator,
                    left: Box::new(acc),
                    right: Box::new(next),
                    pos,
                };
            }
            acc
        }
        _ => return,
    };
    *slot = folded;
}

// ---- value actions ------------------------------------------------

fn a_mark_pointer(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        ctx.pointer_pending = true;
    }
}

fn a_value_number(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let n = ctx.integer;
        ctx.set_statement(Node::Value(Value::number(n, s.position())));
    }
}

fn a_value_argc(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.set_statement(Node::Value(Value::new(ValueKind::ParamTotal, s.position())));
    }
}

fn a_value_string(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let text = ctx.scratch.clone();
        ctx.set_statement(Node::Value(Value::new(
            ValueKind::String(text),
            s.position(),
        )));
    }
}

fn a_value_said(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let text = ctx.scratch.clone();
        ctx.set_statement(Node::Value(Value::new(ValueKind::Said(text), s.position())));
    }
}

fn a_value_selector(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        ctx.set_statement(Node::Value(Value::new(
            ValueKind::Selector(name),
            s.position(),
        )));
    }
}

fn a_value_sizeof(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        ctx.set_statement(Node::Value(Value::new(
            ValueKind::ArraySize(name),
            s.position(),
        )));
    }
}

fn a_value_token(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let mut value = Value::token(ctx.scratch.clone(), s.position());
        value.is_pointer = std::mem::take(&mut ctx.pointer_pending);
        ctx.set_statement(Node::Value(value));
    }
}

fn a_bind_value_indexer(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if !ok {
        return;
    }
    let Some(index) = ctx.take_result() else { return };
    if let Some(Node::Value(value)) = ctx.statement() {
        value.indexer = Some(Box::new(index));
    }
}

fn a_set_lvalue(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        ctx.set_statement(Node::LValue(LValue::new(name, s.position())));
    }
}

fn a_bind_lvalue_indexer(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if !ok {
        return;
    }
    let Some(index) = ctx.take_result() else { return };
    if let Some(Node::LValue(lv)) = ctx.statement() {
        lv.indexer = Some(Box::new(index));
    }
}

// ---- send and call actions ----------------------------------------

fn a_set_send(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let pos = s.position();
        ctx.set_statement(Node::SendCall {
            target: null_node(pos),
            params: Vec::new(),
            pos,
        });
    }
}

fn a_bind_send_target_name(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if !ok {
        return;
    }
    let name = ctx.scratch.clone();
    let pos = s.position();
    if let Some(Node::SendCall { target, .. }) = ctx.statement() {
        *target = Box::new(Node::Value(Value::token(name, pos)));
    }
}

fn a_bind_send_target_statement(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if !ok {
        return;
    }
    let Some(node) = ctx.take_result() else { return };
    if let Some(Node::SendCall { target, .. }) = ctx.statement() {
        *target = Box::new(node);
    }
}

fn a_set_send_param(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let selector = ctx.scratch.clone();
        ctx.set_statement(Node::SendParam {
            selector,
            args: Vec::new(),
            is_property_read: false,
            pos: s.position(),
        });
    }
}

fn a_set_property_read(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let selector = ctx.scratch.clone();
        ctx.set_statement(Node::SendParam {
            selector,
            args: Vec::new(),
            is_property_read: true,
            pos: s.position(),
        });
    }
}

fn a_set_procedure_call(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        ctx.set_statement(Node::ProcedureCall {
            name,
            args: Vec::new(),
            pos: s.position(),
        });
    }
}

fn a_set_rest(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.set_statement(Node::Rest {
            parameter: None,
            pos: s.position(),
        });
    }
}

fn a_bind_rest_parameter(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        if let Some(Node::Rest { parameter, .. }) = ctx.statement() {
            *parameter = Some(name);
        }
    }
}

// ---- asm actions --------------------------------------------------

fn a_set_asm(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.set_statement(Node::Asm {
            body: Vec::new(),
            pos: s.position(),
        });
        ctx.set_extra_keywords(ASM_OPCODES);
    }
}

fn a_clear_asm_keywords(ctx: &mut ParseContext<'_>, _ok: bool, _s: &Stream<'_>) {
    ctx.clear_extra_keywords();
}

fn a_set_asm_statement(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.set_statement(Node::AsmStatement {
            label: None,
            opcode: String::new(),
            operands: Vec::new(),
            pos: s.position(),
        });
    }
}

fn a_set_asm_label(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        if let Some(Node::AsmStatement { label, .. }) = ctx.statement() {
            *label = Some(name);
        }
    }
}

fn a_set_asm_opcode(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        if let Some(Node::AsmStatement { opcode, .. }) = ctx.statement() {
            *opcode = name;
        }
    }
}

// ---- verb clause actions ------------------------------------------

fn a_set_verb_clause(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.set_statement(Node::VerbClause {
            verbs: Vec::new(),
            body: Vec::new(),
            pos: s.position(),
        });
    }
}

fn a_add_verb_name(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        if let Some(Node::VerbClause { verbs, .. }) = ctx.statement() {
            verbs.push(name);
        }
    }
}

fn a_commit_verb_clause(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if !ok {
        return;
    }
    if let Some(Node::VerbClause { verbs, body, pos }) = ctx.take_result() {
        if let Some(class) = &mut ctx.class_builder {
            class.verb_handlers.push(VerbHandler {
                verbs,
                code: body,
                pos,
            });
        }
    }
}

// ---- declaration actions ------------------------------------------

fn a_save_name(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        ctx.scratch2 = ctx.scratch.clone();
    }
}

fn a_begin_function(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.function_builder = Some(Function {
            name: ctx.scratch.clone(),
            pos: s.position(),
            ..Function::default()
        });
    }
}

fn a_add_parameter(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        if let Some(function) = &mut ctx.function_builder {
            function.params.push(name);
        }
    }
}

fn a_add_function_statement(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        if let Some(node) = ctx.take_result() {
            if let Some(function) = &mut ctx.function_builder {
                function.code.push(node);
            }
        }
    }
}

fn a_commit_procedure(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    let function = ctx.function_builder.take();
    if !ok {
        return;
    }
    if let Some(function) = function {
        ctx.script.procedures.push(Procedure {
            function,
            is_public: false,
            owner_class: None,
        });
    }
}

fn a_commit_method(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    let function = ctx.function_builder.take();
    if !ok {
        return;
    }
    if let (Some(function), Some(class)) = (function, &mut ctx.class_builder) {
        class.methods.push(function);
    }
}

fn a_commit_class_procedure(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    let function = ctx.function_builder.take();
    if !ok {
        return;
    }
    if let Some(function) = function {
        if let Some(class) = &mut ctx.class_builder {
            let owner = class.name.clone();
            class.procedures.push(Procedure {
                function,
                is_public: false,
                owner_class: Some(owner),
            });
        }
    }
}

fn a_begin_class(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.class_builder = Some(ClassDecl {
            is_instance: false,
            pos: s.position(),
            ..ClassDecl::default()
        });
    }
}

fn a_begin_instance(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.class_builder = Some(ClassDecl {
            is_instance: true,
            pos: s.position(),
            ..ClassDecl::default()
        });
    }
}

fn a_set_class_name(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        if let Some(class) = &mut ctx.class_builder {
            class.name = name;
        }
    }
}

fn a_set_superclass(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        if let Some(class) = &mut ctx.class_builder {
            class.superclass = Some(name);
        }
    }
}

fn a_commit_class(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    let class = ctx.class_builder.take();
    if !ok {
        return;
    }
    if let Some(class) = class {
        ctx.script.classes.push(class);
    }
}

fn a_commit_property(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if !ok {
        return;
    }
    let Some(value) = ctx.property_value.take() else {
        return;
    };
    let name = ctx.scratch2.clone();
    let pos = s.position();
    if let Some(class) = &mut ctx.class_builder {
        class.properties.push(Property { name, value, pos });
    }
}

fn a_add_method_forward(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        if let Some(class) = &mut ctx.class_builder {
            class.method_forwards.push(name);
        }
    }
}

fn a_begin_var_decl(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.var_decl_builder = Some(VariableDecl::scalar(ctx.scratch.clone(), s.position()));
    }
}

fn a_set_var_size(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        let size = ctx.integer;
        if let Some(decl) = &mut ctx.var_decl_builder {
            decl.size = size;
        }
    }
}

fn a_add_var_initializer(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        if let Some(value) = ctx.property_value.take() {
            if let Some(decl) = &mut ctx.var_decl_builder {
                decl.initializers.push(value);
            }
        }
    }
}

fn a_commit_script_variable(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    let decl = ctx.var_decl_builder.take();
    if !ok {
        return;
    }
    if let Some(decl) = decl {
        ctx.script.variables.push(decl);
    }
}

fn a_commit_temp(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    let decl = ctx.var_decl_builder.take();
    if !ok {
        return;
    }
    if let (Some(decl), Some(function)) = (decl, &mut ctx.function_builder) {
        function.add_temp(decl);
    }
}

fn a_commit_global(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    let decl = ctx.var_decl_builder.take();
    if !ok {
        return;
    }
    if let Some(decl) = decl {
        let index = ctx.integer;
        ctx.script.globals.push(GlobalDecl { decl, index });
    }
}

fn a_begin_define(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.define_builder = Some(Define {
            pos: s.position(),
            ..Define::default()
        });
    }
}

fn a_set_define_name(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        if let Some(define) = &mut ctx.define_builder {
            define.name = name;
        }
    }
}

fn a_set_define_value(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        let value = ctx.integer;
        if let Some(define) = &mut ctx.define_builder {
            define.value = value;
        }
    }
}

fn a_commit_define(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    let define = ctx.define_builder.take();
    if !ok || !ctx.including() {
        return;
    }
    if let Some(define) = define {
        ctx.script.defines.push(define);
    }
}

fn a_reset_enum(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        ctx.integer2 = 0;
    }
}

fn a_set_enum_base(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        ctx.integer2 = ctx.integer;
    }
}

fn a_add_enum_member(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if !ok {
        return;
    }
    let define = Define {
        name: ctx.scratch.clone(),
        value: ctx.integer2,
        pos: s.position(),
    };
    ctx.integer2 = ctx.integer2.wrapping_add(1);
    if ctx.including() {
        ctx.script.defines.push(define);
    }
}

fn a_begin_synonym(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        ctx.synonym_builder = Some(Synonym {
            main_word: ctx.scratch.clone(),
            synonyms: Vec::new(),
            pos: s.position(),
        });
    }
}

fn a_add_synonym_word(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        let word = ctx.scratch.clone();
        if let Some(synonym) = &mut ctx.synonym_builder {
            synonym.synonyms.push(word);
        }
    }
}

fn a_commit_synonym(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    let synonym = ctx.synonym_builder.take();
    if !ok {
        return;
    }
    if let Some(synonym) = synonym {
        ctx.script.synonyms.push(synonym);
    }
}

fn a_commit_export(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let entry = ExportEntry {
            name: ctx.scratch2.clone(),
            slot: ctx.integer,
            pos: s.position(),
        };
        ctx.script.exports.push(entry);
    }
}

fn a_add_include(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok && ctx.including() {
        let name = ctx.scratch.clone();
        ctx.script.includes.push(name);
    }
}

fn a_add_use(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        ctx.script.uses.push(name);
    }
}

fn a_set_script_number(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        ctx.script.script_number = Some(ctx.integer);
    }
}

fn a_set_script_number_define(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if !ok {
        return;
    }
    match ctx.script.define_value(&ctx.scratch) {
        Some(value) => ctx.script.script_number = Some(value),
        None => ctx.error("Expected integer.", s.position()),
    }
}

fn a_set_text_number(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        ctx.script.text_number = Some(ctx.integer);
    }
}

fn a_add_procedure_forward(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok && ctx.including() {
        let name = ctx.scratch.clone();
        ctx.script.procedure_forwards.push(name);
    }
}

fn a_commit_extern(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let entry = ExternDecl {
            name: ctx.scratch2.clone(),
            script: ctx.property_value.take(),
            index: ctx.integer,
            pos: s.position(),
        };
        ctx.script.externs.push(entry);
    }
}

fn a_commit_selector(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let entry = SelectorDecl {
            name: ctx.scratch2.clone(),
            number: ctx.integer,
            pos: s.position(),
        };
        ctx.script.selectors.push(entry);
    }
}

fn a_commit_classdef(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let entry = ClassDefDecl {
            name: ctx.scratch.clone(),
            pos: s.position(),
        };
        ctx.script.class_defs.push(entry);
    }
}

// ---- property value actions ---------------------------------------

fn set_property_value(ctx: &mut ParseContext<'_>, value: Value) {
    ctx.property_value = Some(value);
    ctx.value_was_set = true;
}

fn a_pv_number(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let n = ctx.integer;
        set_property_value(ctx, Value::number(n, s.position()));
    }
}

fn a_pv_string(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let text = ctx.scratch.clone();
        set_property_value(ctx, Value::new(ValueKind::String(text), s.position()));
    }
}

fn a_pv_said(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let text = ctx.scratch.clone();
        set_property_value(ctx, Value::new(ValueKind::Said(text), s.position()));
    }
}

fn a_pv_selector(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        set_property_value(ctx, Value::new(ValueKind::Selector(name), s.position()));
    }
}

fn a_pv_token(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if ok {
        let name = ctx.scratch.clone();
        set_property_value(ctx, Value::token(name, s.position()));
    }
}

// ---- preprocessor actions -----------------------------------------

fn a_enter_ifdef(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        ctx.in_conditional = true;
        ctx.ignoring = !ctx.define_exists(&ctx.scratch);
    }
}

fn a_exit_ifdef(ctx: &mut ParseContext<'_>, ok: bool, _s: &Stream<'_>) {
    if ok {
        ctx.in_conditional = false;
        ctx.ignoring = false;
    }
}

// ---- error actions ------------------------------------------------

fn a_err_expression(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if !ok {
        ctx.report_failure(s, "Expected an expression.");
    }
}

fn a_err_word(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if !ok {
        ctx.report_failure(s, "Expected word.");
    }
}

fn a_err_integer(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if !ok {
        ctx.report_failure(s, "Expected integer.");
    }
}

fn a_err_nonzero(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if !ok {
        ctx.report_failure(s, "Expected non-zero integer.");
    }
}

fn a_err_case(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if !ok {
        ctx.report_failure(s, "Expected case value or 'else' keyword.");
    }
}

fn a_err_method(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if !ok {
        ctx.report_failure(s, "Expected method declaration.");
    }
}

fn a_err_array_size(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if !ok {
        ctx.report_failure(s, "Expected array size.");
    }
}

fn a_err_top(ctx: &mut ParseContext<'_>, ok: bool, s: &Stream<'_>) {
    if !ok {
        ctx.report_failure(s, "Syntax error.");
    }
}
