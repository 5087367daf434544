use crate::models::Domain;

/// Immutable string-to-code table for one categorical feature
///
/// Lookups ignore ASCII case and surrounding whitespace. Strings outside the
/// table encode to `fallback`, which is reserved one past the highest known
/// code: LightGBM routes categories absent from every split bitset the same
/// way it routes categories unseen in training.
#[derive(Debug)]
pub struct CodeTable {
    pub name: &'static str,
    pub entries: &'static [(&'static str, u32)],
    pub fallback: u32,
}

impl CodeTable {
    /// Code for a known category, if any
    pub fn lookup(&self, raw: &str) -> Option<u32> {
        let needle = raw.trim();
        self.entries
            .iter()
            .find(|(category, _)| category.eq_ignore_ascii_case(needle))
            .map(|(_, code)| *code)
    }

    /// Code for any string, substituting the fallback for unseen categories
    pub fn encode(&self, raw: &str) -> u32 {
        self.lookup(raw).unwrap_or(self.fallback)
    }

    /// Highest code assigned to a known category
    pub fn max_code(&self) -> u32 {
        self.entries.iter().map(|(_, code)| *code).max().unwrap_or(0)
    }
}

/// How a schema field is coerced into the feature vector
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Float,
    Integer,
    Categorical(&'static CodeTable),
}

impl FieldKind {
    pub fn expected(&self) -> &'static str {
        match self {
            FieldKind::Float => "a number",
            FieldKind::Integer => "an integer",
            FieldKind::Categorical(_) => "a string",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn float(name: &'static str) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Float }
}

const fn integer(name: &'static str) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Integer }
}

const fn categorical(name: &'static str, table: &'static CodeTable) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Categorical(table) }
}

/// Field order, types and code tables a model was trained on
#[derive(Debug)]
pub struct Schema {
    pub domain: Domain,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    pub fn for_domain(domain: Domain) -> &'static Schema {
        match domain {
            Domain::Maternal => &GDM_SCHEMA,
            Domain::ChildOutcome => &CHILD_SCHEMA,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

// ----------------------------------------------------------------------------
// Code tables
// ----------------------------------------------------------------------------

pub static YES_NO: CodeTable = CodeTable {
    name: "yes_no",
    entries: &[
        ("No", 0),
        ("N", 0),
        ("False", 0),
        ("0", 0),
        ("Yes", 1),
        ("Y", 1),
        ("True", 1),
        ("1", 1),
    ],
    fallback: 2,
};

pub static ETHNICITY: CodeTable = CodeTable {
    name: "ethnicity",
    entries: &[
        ("White", 0),
        ("Asian", 1),
        ("Asian or Asian British", 1),
        ("Black", 2),
        ("Black or Black British", 2),
        ("Mixed", 3),
        ("Other", 4),
        ("Other Ethnic Group", 4),
    ],
    fallback: 5,
};

pub static RISK_FACTORS: CodeTable = CodeTable {
    name: "risk_factors",
    entries: &[
        ("None", 0),
        ("Obesity", 1),
        ("Previous GDM", 2),
        ("Family History of Diabetes", 3),
        ("Previous Macrosomic Baby", 4),
        ("High Risk Ethnicity", 5),
        ("Multiple", 6),
    ],
    fallback: 7,
};

pub static ANTENATAL_MEDICAL_FACTORS: CodeTable = CodeTable {
    name: "antenatal_medical_factors",
    entries: &[
        ("None", 0),
        ("Hypertension", 1),
        ("Pre-existing Diabetes", 2),
        ("Thyroid Disorder", 3),
        ("Asthma", 4),
        ("Mental Health", 5),
        ("Multiple", 6),
    ],
    fallback: 7,
};

pub static PREVIOUS_OBSTETRIC_HISTORY: CodeTable = CodeTable {
    name: "previous_obstetric_history",
    entries: &[
        ("None", 0),
        ("Primigravida", 0),
        ("Previous Caesarean", 1),
        ("Miscarriage", 2),
        ("Stillbirth", 3),
        ("Preterm Birth", 4),
        ("Multiple", 5),
    ],
    fallback: 6,
};

pub static GLUCOSE_TOLERANCE_TEST: CodeTable = CodeTable {
    name: "glucose_tolerance_test",
    entries: &[
        ("Normal", 0),
        ("Abnormal", 1),
        ("Not Done", 2),
        ("Not Indicated", 2),
    ],
    fallback: 3,
};

pub static FOLIC_ACID_DOSE: CodeTable = CodeTable {
    name: "folic_acid_dose",
    entries: &[
        ("None", 0),
        ("400mcg", 1),
        ("400 mcg", 1),
        ("5mg", 2),
        ("5 mg", 2),
    ],
    fallback: 3,
};

pub static DELIVERY_OUTCOME: CodeTable = CodeTable {
    name: "delivery_outcome",
    entries: &[
        ("Spontaneous Vaginal", 0),
        ("Assisted Vaginal", 1),
        ("Elective Caesarean", 2),
        ("Emergency Caesarean", 3),
    ],
    fallback: 4,
};

pub static ONSET_OF_LABOUR: CodeTable = CodeTable {
    name: "onset_of_labour",
    entries: &[
        ("Spontaneous", 0),
        ("Induced", 1),
        ("Caesarean Before Labour", 2),
    ],
    fallback: 3,
};

pub static CAESAREAN_INDICATION: CodeTable = CodeTable {
    name: "caesarean_indication",
    entries: &[
        ("Not Applicable", 0),
        ("N/A", 0),
        ("Failure to Progress", 1),
        ("Fetal Distress", 2),
        ("Previous Caesarean", 3),
        ("Malpresentation", 4),
        ("Maternal Request", 5),
    ],
    fallback: 6,
};

pub static CAESAREAN_CATEGORY: CodeTable = CodeTable {
    name: "caesarean_category",
    entries: &[
        ("Not Applicable", 0),
        ("N/A", 0),
        ("Category 1", 1),
        ("Category 2", 2),
        ("Category 3", 3),
        ("Category 4", 4),
    ],
    fallback: 5,
};

pub static PERINEAL_CARE: CodeTable = CodeTable {
    name: "perineal_care",
    entries: &[
        ("Intact", 0),
        ("First Degree Tear", 1),
        ("Second Degree Tear", 2),
        ("Third Degree Tear", 3),
        ("Fourth Degree Tear", 4),
        ("Episiotomy", 5),
    ],
    fallback: 6,
};

pub static SEX: CodeTable = CodeTable {
    name: "sex",
    entries: &[
        ("Female", 0),
        ("F", 0),
        ("Male", 1),
        ("M", 1),
    ],
    fallback: 2,
};

pub static MATERNITY_MONTH: CodeTable = CodeTable {
    name: "maternity_month",
    entries: &[
        ("January", 0),
        ("February", 1),
        ("March", 2),
        ("April", 3),
        ("May", 4),
        ("June", 5),
        ("July", 6),
        ("August", 7),
        ("September", 8),
        ("October", 9),
        ("November", 10),
        ("December", 11),
    ],
    fallback: 12,
};

// ----------------------------------------------------------------------------
// Schemas
// ----------------------------------------------------------------------------

pub static GDM_SCHEMA: Schema = Schema {
    domain: Domain::Maternal,
    fields: &[
        float("AgeAtStartOfSpell"),
        float("WeightMeasured"),
        float("Height"),
        float("BodyMassIndexAtBooking"),
        categorical("Obese", &YES_NO),
        categorical("Ethnicity", &ETHNICITY),
        float("Glucoselevelblood"),
    ],
};

/// Child outcome model schema; field order is the model's `FEATURE_NAMES`
pub static CHILD_SCHEMA: Schema = Schema {
    domain: Domain::ChildOutcome,
    fields: &[
        float("Index_of_Multiple_Deprivation_Rank"),
        integer("IMD_Decile"),
        float("AgeAtStartOfSpell"),
        float("WeightMeasured"),
        float("Height"),
        float("Body_Mass_Index_at_Booking"),
        integer("Obese"),
        categorical("Ethnicity", &ETHNICITY),
        categorical("Risk_Factors", &RISK_FACTORS),
        categorical("AntenatalMedicalFactors", &ANTENATAL_MEDICAL_FACTORS),
        categorical("PreviousObstetricHistory", &PREVIOUS_OBSTETRIC_HISTORY),
        integer("Parity"),
        integer("Gravida"),
        float("Glucoselevelblood"),
        categorical("GlucoseToleranceTest", &GLUCOSE_TOLERANCE_TEST),
        float("Glucoselevel0minblood"),
        float("Glucoselevel120minblood"),
        categorical("FolicAcidDose", &FOLIC_ACID_DOSE),
        float("SystolicBloodPressureCuff"),
        float("Diastolic_Blood_Pressure"),
        float("VitaminDlevelblood"),
        float("O_Thyroidfunctionblood"),
        categorical("Delivery_Outcome", &DELIVERY_OUTCOME),
        categorical("OnsetofLabourMethod", &ONSET_OF_LABOUR),
        float("Contraction_frequency_prior_to_delivery"),
        categorical("PrimaryIndicationforCaesarean", &CAESAREAN_INDICATION),
        categorical("Category_Caesarean_Section", &CAESAREAN_CATEGORY),
        categorical("Perineal_care", &PERINEAL_CARE),
        float("EstimatedTotalBloodLoss"),
        integer("Gestation"),
        categorical("Severely_Premature", &YES_NO),
        integer("Gestation_Days"),
        float("Gestation_at_booking_Weeks"),
        integer("No_Of_previous_Csections"),
        float("BabyBirthWeight"),
        categorical("Presence_of_meconium", &YES_NO),
        float("BW_Centile"),
        categorical("Shoulder_Dystocia", &YES_NO),
        float("LOS_mother_after_delivery"),
        categorical("Sex", &SEX),
        categorical("Still_Birth", &YES_NO),
        integer("TotalApgarScoreat1minutes"),
        integer("APGAR_Score_5"),
        integer("TotalApgarScoreat10minutes"),
        categorical("Maternity_Month", &MATERNITY_MONTH),
    ],
};
