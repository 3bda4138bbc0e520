/// An individual's sex, or the absence of sex distinction for hermaphroditic
/// models (spec §4.6 "parent sex (for sex-specific maps)").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sex {
    Hermaphrodite,
    Female,
    Male,
}

impl Sex {
    /// Which sex-specific rate map half to use when drawing crossover
    /// breakpoints and mutations for a haplosome contributed by an
    /// individual of this sex (spec §3 "one or a pair of (male/female)...
    /// rate maps").
    pub fn is_male(&self) -> bool {
        matches!(self, Sex::Male)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_male_reports_is_male() {
        assert!(Sex::Male.is_male());
        assert!(!Sex::Female.is_male());
        assert!(!Sex::Hermaphrodite.is_male());
    }
}
