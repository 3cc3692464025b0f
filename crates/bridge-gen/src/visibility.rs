//! Member visibility
//!
//! A class member is bridged when it is an instance member without a
//! `private` or `protected` modifier and is not an ECMAScript `#private`
//! member. Unmarked members count as public.

use deno_ast::swc::ast as swc_ast;

/// Visibility of a class member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    /// `private` modifier
    Private,
    /// `#name` member
    EcmaPrivate,
}

impl Visibility {
    pub fn from_accessibility(access: Option<swc_ast::Accessibility>) -> Self {
        match access {
            Some(swc_ast::Accessibility::Private) => Visibility::Private,
            Some(swc_ast::Accessibility::Protected) => Visibility::Protected,
            Some(swc_ast::Accessibility::Public) | None => Visibility::Public,
        }
    }

    /// Visibility of a class member; `None` for members that are not
    /// methods or accessors
    pub fn of_member(member: &swc_ast::ClassMember) -> Option<Self> {
        match member {
            swc_ast::ClassMember::Method(m) => Some(Self::from_accessibility(m.accessibility)),
            swc_ast::ClassMember::PrivateMethod(_) => Some(Visibility::EcmaPrivate),
            _ => None,
        }
    }

    pub fn is_bridged(&self) -> bool {
        matches!(self, Visibility::Public)
    }

    pub fn display(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
            Visibility::EcmaPrivate => "#private",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_public_members_are_bridged() {
        assert!(Visibility::from_accessibility(None).is_bridged());
        assert!(Visibility::from_accessibility(Some(swc_ast::Accessibility::Public)).is_bridged());
        assert!(!Visibility::from_accessibility(Some(swc_ast::Accessibility::Private)).is_bridged());
        assert!(
            !Visibility::from_accessibility(Some(swc_ast::Accessibility::Protected)).is_bridged()
        );
        assert!(!Visibility::EcmaPrivate.is_bridged());
    }
}
