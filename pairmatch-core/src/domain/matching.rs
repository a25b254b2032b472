use crate::domain::session::{Gender, Preference, Session};

/// One half of the symmetric compatibility predicate.
///
/// `Both` accepts anyone, including participants that never stated a
/// gender. The targeted preferences require the matching gender to be
/// present; an unset gender satisfies nothing but `Both`.
pub fn pref_matches(pref: Preference, gender: Option<Gender>) -> bool {
    match (pref, gender) {
        (Preference::Both, _) => true,
        (Preference::Girls, Some(Gender::Female)) => true,
        (Preference::Guys, Some(Gender::Male)) => true,
        _ => false,
    }
}

/// Two sessions may be paired iff each one's preference accepts the
/// other's gender. Sessions without a stated preference match no one.
pub fn compatible(a: &Session, b: &Session) -> bool {
    let (Some(a_pref), Some(b_pref)) = (a.preference, b.preference) else {
        return false;
    };
    pref_matches(a_pref, b.gender) && pref_matches(b_pref, a.gender)
}
