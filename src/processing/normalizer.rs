//! Profile normalization
//!
//! Collapses an [`ExtractedProfile`] into the one-line summary that gets
//! embedded: `"{job_title}. Skills: {skills}. Education: {diplomas}"`.
//! Companies, emails and links are dropped. Extracted text is inserted as-is.

use crate::processing::entities::ExtractedProfile;

pub fn normalize_profile(profile: &ExtractedProfile) -> String {
    format!(
        "{}. Skills: {}. Education: {}",
        profile.job_title,
        profile.skills.join(", "),
        profile.diplomas.join(" ")
    )
}

impl ExtractedProfile {
    pub fn normalized(&self) -> String {
        normalize_profile(self)
    }
}
