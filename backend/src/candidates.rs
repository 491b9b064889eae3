//! The fixed candidate roster for the election.
//!
//! Candidates are not stored in the database; this single ordered list is the
//! reference dataset shared between tallying and the candidates endpoint.

pub static CANDIDATES: &[&str] = &[
    "Erich",
    "Doni",
    "M.Ilham",
    "Ragil",
    "Sutrisno",
    "Bayu",
    "Bambang",
    "Azlika",
    "Indra",
    "Robert",
    "Heri",
    "Zerinof",
    "Siska",
    "Vina",
    "Fadly",
    "Taofik",
    "Zakaria",
    "Irfan",
    "Rois",
    "Farhan",
    "Ozan",
    "Joko",
    "Awal",
    "Sudariyanto",
    "Afriki",
    "Arif H",
    "Pringgo",
    "Devi",
    "Ferry",
    "Reynal",
    "Hermawan",
    "Jerry",
    "Rizal",
    "Wanda",
    "Abdul",
    "Rama",
    "Bilal",
    "Ricky",
    "Denny",
    "Bowo",
    "Toha",
    "Daniel 1",
    "Daniel 2",
    "Ratih",
    "Hermanto",
    "Akmal",
    "Acep",
    "Andika",
    "Arif",
    "Ocan",
    "Ajip",
    "Tunggul",
    "Alberto",
    "Fitria",
    "Edi",
    "Rina",
    "Fikri",
    "Muchlis",
    "Rizal Amin",
    "Anjar",
    "Iwan",
    "Yoga",
    "Sri",
    "Gendras",
    "Vinie",
    "Handoko",
    "Ariyanto",
    "Bu Rizka",
    "Tomi",
    "Samuel",
    "Feodella",
    "Asmariah",
    "Arnold",
    "Fandy",
    "Ilham Dwi",
    "Efendi",
    "Syafiyyah",
    "Benedecta",
];

pub fn is_candidate(name: &str) -> bool {
    CANDIDATES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn roster_has_no_duplicate_names() {
        let unique: HashSet<&str> = CANDIDATES.iter().copied().collect();
        assert_eq!(unique.len(), CANDIDATES.len());
    }

    #[test]
    fn roster_is_complete() {
        assert_eq!(CANDIDATES.len(), 78);
        assert_eq!(CANDIDATES[0], "Erich");
        assert_eq!(CANDIDATES[CANDIDATES.len() - 1], "Benedecta");
    }

    #[test]
    fn membership_is_exact_match() {
        assert!(is_candidate("Doni"));
        assert!(is_candidate("Rizal Amin"));
        assert!(!is_candidate("doni"));
        assert!(!is_candidate("Doni "));
        assert!(!is_candidate("Nobody"));
    }
}
