use descent::output::NullSink;
use descent::{emit, evaluate, ErrorCategory, Program, Temp};
use proptest::prelude::*;

const MAX_INPUT_BYTES: usize = 256;

/// Well-formed expressions with every token separated by a single space.
fn expression() -> impl Strategy<Value = String> {
    let literal = (0u32..1000).prop_map(|n| n.to_string());
    literal.prop_recursive(5, 48, 2, |inner| {
        prop_oneof![
            (inner.clone(), prop::sample::select(vec!['+', '-', '*', '/']), inner.clone())
                .prop_map(|(lhs, op, rhs)| format!("{lhs} {op} {rhs}")),
            inner.prop_map(|e| format!("( {e} )")),
        ]
    })
}

fn outcome(src: &str) -> Result<i64, descent::ErrorKind> {
    evaluate(src).map(|e| e.value).map_err(|e| e.kind)
}

fn assert_single_assignment(program: &Program) -> Result<(), TestCaseError> {
    for (index, instruction) in program.instructions.iter().enumerate() {
        prop_assert_eq!(instruction.dest, Temp(index as u64 + 1));
        for operand in [instruction.lhs, instruction.rhs] {
            if let Some(temp) = operand.as_temp() {
                prop_assert!(temp < instruction.dest);
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn arbitrary_input_never_panics(
        bytes in proptest::collection::vec(any::<u8>(), 0..=MAX_INPUT_BYTES)
    ) {
        let input = String::from_utf8_lossy(&bytes).into_owned();
        let _ = evaluate(&input);
        let _ = emit(&input, &mut NullSink).map(|program| program.execute());
    }

    #[test]
    fn subtraction_and_division_fold_left(a in 0i64..10_000, b in 0i64..10_000, c in 1i64..10_000) {
        prop_assert_eq!(outcome(&format!("{a} - {b} - {c}")), Ok(a - b - c));
        prop_assert_eq!(outcome(&format!("{a} / {c} / {c}")), Ok(a / c / c));
    }

    #[test]
    fn whitespace_between_tokens_is_insignificant(src in expression()) {
        let compact = src.replace(' ', "");
        let spaced = src.replace(' ', " \t\n  ");
        let expected = outcome(&src);
        prop_assert_eq!(outcome(&compact), expected.clone());
        prop_assert_eq!(outcome(&spaced), expected);
    }

    #[test]
    fn emitted_code_computes_the_evaluated_value(src in expression()) {
        let lowered = emit(&src, &mut NullSink).and_then(|program| program.execute());
        match evaluate(&src) {
            Ok(evaluation) => {
                prop_assert!(evaluation.is_clean());
                prop_assert_eq!(lowered.map_err(|e| e.kind), Ok(evaluation.value));
            }
            Err(err) => {
                prop_assert_eq!(err.category(), ErrorCategory::Arithmetic);
                let lowered_err = lowered.err();
                prop_assert!(lowered_err.is_some());
                prop_assert_eq!(
                    lowered_err.map(|e| e.category()),
                    Some(ErrorCategory::Arithmetic)
                );
            }
        }
    }

    #[test]
    fn temps_are_defined_once_and_before_use(src in expression()) {
        if let Ok(program) = emit(&src, &mut NullSink) {
            assert_single_assignment(&program)?;
            let operators = src.chars().filter(|c| "+-*/".contains(*c)).count();
            prop_assert_eq!(program.instructions.len(), operators);
        }
    }
}
