//! Cross-entropy scoring
//!
//! All scores are per-token cost vectors measured by the judge. `xent`
//! scores a text in its context; the other measures are built from it.

use crate::judge::{Judge, JudgeError};
use crate::value::{TokenXentList, ValidatedBool, XString};

/// Few-shot framing used by the truth classifier; the statement is appended.
const TRUTH_TEMPLATE: &str = "Statement: Water is wet.\nAnswer: true\n\
Statement: The moon is made of cheese.\nAnswer: false\n\
Statement: ";

const TRUTH_QUESTION: &str = "\nAnswer:";

/// Cost of `text` read after `context` and then `text`'s own decoration.
pub fn xent(judge: &dyn Judge, text: &XString, context: &str) -> Result<TokenXentList, JudgeError> {
    let prefix = judge.tokenize(&format!("{}{}", context, text.prefix));
    let target = judge.tokenize(&text.primary);
    let prefix_len = prefix.len();

    let mut sequence = prefix;
    sequence.extend(target.iter().cloned());
    let costs = judge.score(&sequence, prefix_len)?;
    if costs.len() != target.len() {
        return Err(JudgeError::CostCount {
            expected: target.len(),
            got: costs.len(),
        });
    }
    Ok(TokenXentList::new(target.into_iter().zip(costs).collect()))
}

/// Negated `xent`.
pub fn nex(judge: &dyn Judge, text: &XString, context: &str) -> Result<TokenXentList, JudgeError> {
    Ok(xent(judge, text, context)?.neg())
}

/// Information gained from the decoration: `xent(plain) - xent(decorated)`.
pub fn xed(judge: &dyn Judge, text: &XString, context: &str) -> Result<TokenXentList, JudgeError> {
    let plain = xent(judge, &text.plain(), context)?;
    let decorated = xent(judge, text, context)?;
    plain
        .sub_aligned(&decorated)
        .map_err(|e| JudgeError::Backend(e.to_string()))
}

/// Negated `xed`.
pub fn dex(judge: &dyn Judge, text: &XString, context: &str) -> Result<TokenXentList, JudgeError> {
    Ok(xed(judge, text, context)?.neg())
}

/// Whether the judge finds `statement` more likely true than false.
pub fn is_true(judge: &dyn Judge, statement: &XString) -> Result<ValidatedBool, JudgeError> {
    let prompt = XString::new(format!(
        "{}{}{}",
        TRUTH_TEMPLATE, statement.primary, TRUTH_QUESTION
    ));
    let yes = xent(judge, &XString::new(" true").decorate(&prompt), "")?.total();
    let no = xent(judge, &XString::new(" false").decorate(&prompt), "")?.total();
    Ok(ValidatedBool::new(
        yes < no,
        format!(
            "is_true({:?}): xent(true) = {:.3}, xent(false) = {:.3}",
            statement.primary, yes, no
        ),
    ))
}

/// Negation of [`is_true`].
pub fn is_false(judge: &dyn Judge, statement: &XString) -> Result<ValidatedBool, JudgeError> {
    Ok(is_true(judge, statement)?.not())
}

/// The first `n` judge tokens of `text`, keeping its decoration.
pub fn first_n_tokens(judge: &dyn Judge, text: &XString, n: usize) -> XString {
    let tokens = judge.tokenize(&text.primary);
    if tokens.len() <= n {
        return text.clone();
    }
    XString::decorated(tokens[..n].concat(), text.prefix.clone())
}
