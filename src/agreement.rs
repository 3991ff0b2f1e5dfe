use crate::error::IrrError;

/// Gwet's AC1 for two raters over binary judgments.
///
/// `observed` is the raw index-wise agreement rate; chance agreement uses the
/// pooled positive rate `p1` across both raters, `2 * p1 * (1 - p1)`. With
/// binary inputs the chance term peaks at 0.5, so the denominator never
/// vanishes. Total consensus (p1 of exactly 0 or 1) gives zero chance
/// agreement and AC1 collapses to the observed rate, which is 1.0 there; it
/// is a legitimate score, not an error.
pub fn gwets_ac1(a: &[bool], b: &[bool]) -> Result<f64, IrrError> {
    debug_assert_eq!(a.len(), b.len(), "rater sequences must be index-paired");

    let n = a.len();
    if n == 0 {
        return Err(IrrError::EmptyInput);
    }

    let matches = a.iter().zip(b).filter(|(x, y)| x == y).count();
    let observed = matches as f64 / n as f64;

    let mean_a = a.iter().filter(|&&x| x).count() as f64 / n as f64;
    let mean_b = b.iter().filter(|&&x| x).count() as f64 / n as f64;
    let p1 = (mean_a + mean_b) / 2.0;
    let chance = 2.0 * p1 * (1.0 - p1);

    Ok((observed - chance) / (1.0 - chance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ac1(a: &[bool], b: &[bool]) -> f64 {
        gwets_ac1(a, b).expect("non-empty input")
    }

    #[test]
    fn empty_input_is_an_error_not_a_nan() {
        let err = gwets_ac1(&[], &[]).expect_err("zero documents");
        assert!(matches!(err, IrrError::EmptyInput));
    }

    #[test]
    fn identical_sequences_score_exactly_one() {
        let mixed = [true, false, true, true, false];
        assert_eq!(ac1(&mixed, &mixed), 1.0);
    }

    #[test]
    fn constant_consensus_is_one_not_nan() {
        // p1 = 0 and p1 = 1 both zero out the chance term.
        let all_true = [true; 4];
        let all_false = [false; 4];
        assert_eq!(ac1(&all_true, &all_true), 1.0);
        assert_eq!(ac1(&all_false, &all_false), 1.0);
    }

    #[test]
    fn ac1_is_symmetric_in_its_raters() {
        let a = [true, true, false, true, false, false];
        let b = [true, false, false, true, true, false];
        assert_eq!(ac1(&a, &b), ac1(&b, &a));
    }

    #[test]
    fn ac1_never_exceeds_one() {
        let cases: [(&[bool], &[bool]); 4] = [
            (&[true, false, true], &[true, false, true]),
            (&[true, false, true], &[false, true, false]),
            (&[true, true, true], &[false, false, false]),
            (&[true, false, false, false], &[true, true, false, false]),
        ];
        for (a, b) in cases {
            let score = ac1(a, b);
            assert!(score <= 1.0, "AC1 above 1.0 for {a:?} vs {b:?}: {score}");
        }
    }

    #[test]
    fn disagreement_lowers_the_score_below_one() {
        let a = [true, true, false];
        let b = [true, false, false];
        assert!(ac1(&a, &b) < 1.0);
    }

    #[test]
    fn worked_example_matches_hand_computation() {
        // Judgments from the 3-document scenario: 2/3 observed agreement,
        // pooled p1 = 0.5, chance = 0.5, AC1 = (2/3 - 1/2) / (1/2) = 1/3.
        let a = [true, true, false];
        let b = [true, false, false];
        let score = ac1(&a, &b);
        assert!((score - 1.0 / 3.0).abs() < 1e-12, "got {score}");
    }
}
