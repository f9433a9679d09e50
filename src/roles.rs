use crate::config::FILTER_KEY_PREFIX;
use crate::error::UnknownRole;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Portal user roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    JobSeeker,
    Mentor,
    Recruiter,
    Educator,
    Administrator,
}

/// Icons a role can be rendered with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleIcon {
    GraduationCap,
    Briefcase,
    Users,
    Search,
    BookOpen,
    Shield,
}

impl RoleIcon {
    /// Icon name in the portal's icon set
    pub fn name(&self) -> &'static str {
        match self {
            RoleIcon::GraduationCap => "graduation-cap",
            RoleIcon::Briefcase => "briefcase",
            RoleIcon::Users => "users",
            RoleIcon::Search => "search",
            RoleIcon::BookOpen => "book-open",
            RoleIcon::Shield => "shield",
        }
    }
}

impl Role {
    pub fn all() -> &'static [Role] {
        &[
            Role::Student,
            Role::JobSeeker,
            Role::Mentor,
            Role::Recruiter,
            Role::Educator,
            Role::Administrator,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::JobSeeker => "jobseeker",
            Role::Mentor => "mentor",
            Role::Recruiter => "recruiter",
            Role::Educator => "educator",
            Role::Administrator => "administrator",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::JobSeeker => "Job Seeker",
            Role::Mentor => "Mentor",
            Role::Recruiter => "Recruiter",
            Role::Educator => "Educator",
            Role::Administrator => "Administrator",
        }
    }

    pub fn icon(&self) -> RoleIcon {
        match self {
            Role::Student => RoleIcon::GraduationCap,
            Role::JobSeeker => RoleIcon::Briefcase,
            Role::Mentor => RoleIcon::Users,
            Role::Recruiter => RoleIcon::Search,
            Role::Educator => RoleIcon::BookOpen,
            Role::Administrator => RoleIcon::Shield,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Administrator)
    }

    /// Storage key for this role's filters on `page`, e.g. `filters:student:jobs`.
    pub fn filter_key(&self, page: &str) -> String {
        format!("{FILTER_KEY_PREFIX}:{}:{page}", self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Role::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == wanted)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_names() {
        for role in Role::all() {
            assert_eq!(role.as_str().parse::<Role>(), Ok(*role));
        }
        assert_eq!(" Mentor ".parse::<Role>(), Ok(Role::Mentor));
        let err = "admin@gov.ae".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("admin@gov.ae".into()));
        assert_eq!(err.to_string(), "Unknown role: admin@gov.ae");
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Role::JobSeeker).unwrap();
        assert_eq!(json, r#""jobseeker""#);
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::JobSeeker);
    }

    #[test]
    fn only_administrators_are_admins() {
        let admins: Vec<_> = Role::all().iter().filter(|r| r.is_admin()).collect();
        assert_eq!(admins, vec![&Role::Administrator]);
    }

    #[test]
    fn filter_keys_are_scoped() {
        assert_eq!(Role::Student.filter_key("scholarships"), "filters:student:scholarships");
        assert_eq!(Role::Recruiter.icon().name(), "search");
    }
}
