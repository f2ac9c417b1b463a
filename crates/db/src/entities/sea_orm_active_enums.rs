//! Database enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Authentication provider for a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "auth_provider")]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// Email/phone + password account.
    #[sea_orm(string_value = "local")]
    Local,
    /// Google federated account.
    #[sea_orm(string_value = "google")]
    Google,
}

/// Species of a registered pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "pet_type")]
pub enum PetType {
    #[sea_orm(string_value = "Dog")]
    Dog,
    #[sea_orm(string_value = "Cat")]
    Cat,
    #[sea_orm(string_value = "Rabbit")]
    Rabbit,
    #[sea_orm(string_value = "Hamster")]
    Hamster,
    #[sea_orm(string_value = "Guinea Pig")]
    #[serde(rename = "Guinea Pig")]
    GuineaPig,
    #[sea_orm(string_value = "Bird")]
    Bird,
    #[sea_orm(string_value = "Other")]
    Other,
}

impl std::str::FromStr for PetType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Dog" => Ok(Self::Dog),
            "Cat" => Ok(Self::Cat),
            "Rabbit" => Ok(Self::Rabbit),
            "Hamster" => Ok(Self::Hamster),
            "Guinea Pig" => Ok(Self::GuineaPig),
            "Bird" => Ok(Self::Bird),
            "Other" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

/// Pet gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "pet_gender")]
pub enum Gender {
    #[sea_orm(string_value = "Male")]
    Male,
    #[sea_orm(string_value = "Female")]
    Female,
}

impl std::str::FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Self::Male),
            "Female" => Ok(Self::Female),
            _ => Err(()),
        }
    }
}

/// Coat color of a registered pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "pet_color")]
pub enum PetColor {
    #[sea_orm(string_value = "Black")]
    Black,
    #[sea_orm(string_value = "White")]
    White,
    #[sea_orm(string_value = "Brown")]
    Brown,
    #[sea_orm(string_value = "Golden")]
    Golden,
    #[sea_orm(string_value = "Gray")]
    Gray,
    #[sea_orm(string_value = "Orange")]
    Orange,
    #[sea_orm(string_value = "Cream")]
    Cream,
    #[sea_orm(string_value = "Multi-colored")]
    #[serde(rename = "Multi-colored")]
    MultiColored,
    #[sea_orm(string_value = "Other")]
    Other,
}

impl std::str::FromStr for PetColor {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Black" => Ok(Self::Black),
            "White" => Ok(Self::White),
            "Brown" => Ok(Self::Brown),
            "Golden" => Ok(Self::Golden),
            "Gray" => Ok(Self::Gray),
            "Orange" => Ok(Self::Orange),
            "Cream" => Ok(Self::Cream),
            "Multi-colored" => Ok(Self::MultiColored),
            "Other" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

/// Kind of a lost/found report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "report_type")]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    #[sea_orm(string_value = "lost")]
    Lost,
    #[sea_orm(string_value = "found")]
    Found,
    #[sea_orm(string_value = "sighting")]
    Sighting,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_pet_type_from_str() {
        assert_eq!(PetType::from_str("Dog"), Ok(PetType::Dog));
        assert_eq!(PetType::from_str("Guinea Pig"), Ok(PetType::GuineaPig));
        assert!(PetType::from_str("Dragon").is_err());
        assert!(PetType::from_str("dog").is_err());
    }

    #[test]
    fn test_pet_color_from_str() {
        assert_eq!(PetColor::from_str("Multi-colored"), Ok(PetColor::MultiColored));
        assert!(PetColor::from_str("Purple").is_err());
    }

    #[test]
    fn test_gender_from_str() {
        assert_eq!(Gender::from_str("Male"), Ok(Gender::Male));
        assert_eq!(Gender::from_str("Female"), Ok(Gender::Female));
        assert!(Gender::from_str("Unknown").is_err());
    }
}
