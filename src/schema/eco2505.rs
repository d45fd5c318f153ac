//! BoM document schema 25/05
//!
//! Same document shape as [23/01](super::eco2301), in its own namespace.
//! Every record reference is an [`ExtendedMIRecordReference`], which can
//! point at equivalent records in other databases, and parts and processes
//! gain a location and a transport phase.

use std::ops::Deref;

use serde_json::Value;

use crate::descriptor::{
    CustomField, Document, FieldDescriptor, FieldSet, Node, NodeType, ScalarValue, node_list,
    opt_node, opt_scalar, to_scalar,
};
use crate::error::Result;
use crate::name::QualifiedName;
use crate::reader::{Reader, read_base_node};
use crate::registry::TypeRegistry;
use crate::schema::gbt1205::{self, MIRecordReference};
use crate::writer::Writer;

pub use super::eco2301::{Category, DimensionType};

/// Namespace URI of the 25/05 BoM schema
pub const NAMESPACE: &str = "http://www.grantadesign.com/25/05/BillOfMaterialsEco";

const fn eco(local_name: &'static str) -> QualifiedName<'static> {
    QualifiedName::new(local_name, NAMESPACE)
}

/// A record reference that also lists equivalent records in other databases
///
/// Reads and writes every field of the wrapped [`MIRecordReference`] on the
/// same element, plus an `EquivalentReferences` list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedMIRecordReference {
    /// The primary reference
    pub reference: MIRecordReference,
    /// Equivalent records, in document order
    pub equivalent_references: Vec<MIRecordReference>,
}

impl ExtendedMIRecordReference {
    /// Add an equivalent record
    pub fn with_equivalent(mut self, reference: MIRecordReference) -> Self {
        self.equivalent_references.push(reference);
        self
    }
}

impl From<MIRecordReference> for ExtendedMIRecordReference {
    fn from(reference: MIRecordReference) -> Self {
        Self {
            reference,
            equivalent_references: Vec::new(),
        }
    }
}

impl Deref for ExtendedMIRecordReference {
    type Target = MIRecordReference;

    fn deref(&self) -> &MIRecordReference {
        &self.reference
    }
}

impl NodeType for ExtendedMIRecordReference {
    const TYPE_NAME: &'static str = "ExtendedMIRecordReference";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Base {
            base_type: MIRecordReference::TYPE_NAME,
            property: "reference",
            read: read_base_node::<MIRecordReference>,
            get: |e| &e.reference as &dyn Node,
            names: <MIRecordReference as NodeType>::claimed_names,
        },
        FieldDescriptor::List {
            item_type: MIRecordReference::TYPE_NAME,
            property: "equivalent_references",
            container: eco("EquivalentReferences"),
            item: eco("EquivalentReference"),
            get: |e| node_list(&e.equivalent_references),
        },
    ];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            reference: fields.required_single("reference")?,
            equivalent_references: fields.list("equivalent_references")?,
        })
    }
}

/// Fate of a material or part at the end of the product's life
#[derive(Debug, Clone, PartialEq)]
pub struct EndOfLifeFate {
    /// Reference to the end-of-life record
    pub mi_end_of_life_reference: ExtendedMIRecordReference,
    /// Fraction of the item subject to this fate
    pub fraction: f64,
}

impl NodeType for EndOfLifeFate {
    const TYPE_NAME: &'static str = "EndOfLifeFate";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Single {
            child_type: ExtendedMIRecordReference::TYPE_NAME,
            property: "mi_end_of_life_reference",
            name: eco("MIEndOfLifeReference"),
            get: |f| Some(&f.mi_end_of_life_reference as &dyn Node),
        },
        FieldDescriptor::Scalar {
            property: "fraction",
            name: eco("Fraction"),
            get: |f| to_scalar(&f.fraction),
        },
    ];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            mi_end_of_life_reference: fields.required_single("mi_end_of_life_reference")?,
            fraction: fields.required("fraction")?,
        })
    }
}

/// A quantity with an optional unit
#[derive(Debug, Clone, PartialEq)]
pub struct UnittedValue {
    /// Numeric value, held as the element text
    pub value: f64,
    /// Unit symbol
    pub unit: Option<String>,
}

impl UnittedValue {
    /// Create a value with a unit
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: Some(unit.into()),
        }
    }
}

impl NodeType for UnittedValue {
    const TYPE_NAME: &'static str = "UnittedValue";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Scalar {
            property: "value",
            name: QualifiedName::text(),
            get: |v| to_scalar(&v.value),
        },
        FieldDescriptor::Scalar {
            property: "unit",
            name: eco("@Unit"),
            get: |v| opt_scalar(&v.unit),
        },
    ];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            value: fields.required("value")?,
            unit: fields.optional("unit")?,
        })
    }
}

/// Location where an item is produced, or where a BoM is assembled
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Location {
    /// Reference to the location record
    pub mi_location_reference: Option<ExtendedMIRecordReference>,
    /// Display identity
    pub identity: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Reference used by the producing application
    pub external_identity: Option<String>,
    /// Identity of the element within the BoM
    pub internal_id: Option<String>,
}

impl NodeType for Location {
    const TYPE_NAME: &'static str = "Location";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Scalar {
            property: "internal_id",
            name: eco("@id"),
            get: |l| opt_scalar(&l.internal_id),
        },
        FieldDescriptor::Single {
            child_type: ExtendedMIRecordReference::TYPE_NAME,
            property: "mi_location_reference",
            name: eco("MILocationReference"),
            get: |l| opt_node(&l.mi_location_reference),
        },
        FieldDescriptor::Scalar {
            property: "identity",
            name: eco("Identity"),
            get: |l| opt_scalar(&l.identity),
        },
        FieldDescriptor::Scalar {
            property: "name",
            name: eco("Name"),
            get: |l| opt_scalar(&l.name),
        },
        FieldDescriptor::Scalar {
            property: "external_identity",
            name: eco("ExternalIdentity"),
            get: |l| opt_scalar(&l.external_identity),
        },
    ];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            mi_location_reference: fields.single("mi_location_reference")?,
            identity: fields.optional("identity")?,
            name: fields.optional("name")?,
            external_identity: fields.optional("external_identity")?,
            internal_id: fields.optional("internal_id")?,
        })
    }
}

/// Electricity generation mix of a region
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElectricityMix {
    /// Reference to the region record
    pub mi_region_reference: Option<ExtendedMIRecordReference>,
    /// Share of electricity generated from fossil fuels, in percent
    pub percentage_fossil_fuels: Option<f64>,
}

impl NodeType for ElectricityMix {
    const TYPE_NAME: &'static str = "ElectricityMix";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Single {
            child_type: ExtendedMIRecordReference::TYPE_NAME,
            property: "mi_region_reference",
            name: eco("MIRegionReference"),
            get: |m| opt_node(&m.mi_region_reference),
        },
        FieldDescriptor::Scalar {
            property: "percentage_fossil_fuels",
            name: eco("PercentageFossilFuels"),
            get: |m| opt_scalar(&m.percentage_fossil_fuels),
        },
    ];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            mi_region_reference: fields.single("mi_region_reference")?,
            percentage_fossil_fuels: fields.optional("percentage_fossil_fuels")?,
        })
    }
}

/// Use of a product that moves, such as a vehicle
#[derive(Debug, Clone, PartialEq)]
pub struct MobileMode {
    /// Reference to the transport type record
    pub mi_transport_reference: ExtendedMIRecordReference,
    /// Days per year the product is used
    pub days_used_per_year: f64,
    /// Distance travelled on each day of use
    pub distance_travelled_per_day: UnittedValue,
}

impl NodeType for MobileMode {
    const TYPE_NAME: &'static str = "MobileMode";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Single {
            child_type: ExtendedMIRecordReference::TYPE_NAME,
            property: "mi_transport_reference",
            name: eco("MITransportReference"),
            get: |m| Some(&m.mi_transport_reference as &dyn Node),
        },
        FieldDescriptor::Scalar {
            property: "days_used_per_year",
            name: eco("DaysUsedPerYear"),
            get: |m| to_scalar(&m.days_used_per_year),
        },
        FieldDescriptor::Single {
            child_type: UnittedValue::TYPE_NAME,
            property: "distance_travelled_per_day",
            name: eco("DistanceTravelledPerDay"),
            get: |m| Some(&m.distance_travelled_per_day as &dyn Node),
        },
    ];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            mi_transport_reference: fields.required_single("mi_transport_reference")?,
            days_used_per_year: fields.required("days_used_per_year")?,
            distance_travelled_per_day: fields.required_single("distance_travelled_per_day")?,
        })
    }
}

const USAGE: QualifiedName<'static> = eco("Usage");
const DAYS_USED_PER_YEAR: QualifiedName<'static> = eco("DaysUsedPerYear");
const HOURS_USED_PER_DAY: QualifiedName<'static> = eco("HoursUsedPerDay");

/// Use of a product that stays in place and consumes energy
#[derive(Debug, Clone, PartialEq)]
pub struct StaticMode {
    /// Reference to the energy conversion record
    pub mi_energy_conversion_reference: ExtendedMIRecordReference,
    /// Power drawn while in use
    pub power_rating: UnittedValue,
    /// Days per year the product is used
    pub days_used_per_year: f64,
    /// Hours per day of use
    pub hours_used_per_day: f64,
}

impl NodeType for StaticMode {
    const TYPE_NAME: &'static str = "StaticMode";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Single {
            child_type: ExtendedMIRecordReference::TYPE_NAME,
            property: "mi_energy_conversion_reference",
            name: eco("MIEnergyConversionReference"),
            get: |m| Some(&m.mi_energy_conversion_reference as &dyn Node),
        },
        FieldDescriptor::Single {
            child_type: UnittedValue::TYPE_NAME,
            property: "power_rating",
            name: eco("PowerRating"),
            get: |m| Some(&m.power_rating as &dyn Node),
        },
    ];
    const CUSTOM_FIELDS: &'static [CustomField] = &[
        CustomField::new("days_used_per_year", USAGE),
        CustomField::new("hours_used_per_day", USAGE),
    ];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            mi_energy_conversion_reference: fields
                .required_single("mi_energy_conversion_reference")?,
            power_rating: fields.required_single("power_rating")?,
            days_used_per_year: fields.required("days_used_per_year")?,
            hours_used_per_day: fields.required("hours_used_per_day")?,
        })
    }

    fn custom_read(doc: &Document, reader: &Reader<'_>) -> Result<FieldSet> {
        let mut fields = FieldSet::new(Self::TYPE_NAME);
        if let Some(usage) = reader.get_wrapper(Self::TYPE_NAME, doc, &USAGE)? {
            if let Some(days) = reader.get_field(usage, &DAYS_USED_PER_YEAR)? {
                fields.insert_scalar("days_used_per_year", days.clone())?;
            }
            if let Some(hours) = reader.get_field(usage, &HOURS_USED_PER_DAY)? {
                fields.insert_scalar("hours_used_per_day", hours.clone())?;
            }
        }
        Ok(fields)
    }

    fn custom_write(&self, out: &mut Document, writer: &Writer<'_>) -> Result<()> {
        let mut usage = Document::new();
        usage.insert(
            writer.key(&DAYS_USED_PER_YEAR)?,
            writer.scalar(Self::TYPE_NAME, "days_used_per_year", &self.days_used_per_year)?,
        );
        usage.insert(
            writer.key(&HOURS_USED_PER_DAY)?,
            writer.scalar(Self::TYPE_NAME, "hours_used_per_day", &self.hours_used_per_day)?,
        );
        out.insert(writer.key(&USAGE)?, Value::Object(usage));
        Ok(())
    }
}

/// How the utility of a product compares to the industry average
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UtilitySpecification {
    /// Average product life in the industry, in years
    pub industry_average_duration_years: Option<f64>,
    /// Average number of functional units delivered in the industry
    pub industry_average_number_of_functional_units: Option<f64>,
    /// Utility relative to the industry average
    pub utility: Option<f64>,
}

impl NodeType for UtilitySpecification {
    const TYPE_NAME: &'static str = "UtilitySpecification";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Scalar {
            property: "industry_average_duration_years",
            name: eco("IndustryAverageDurationYears"),
            get: |u| opt_scalar(&u.industry_average_duration_years),
        },
        FieldDescriptor::Scalar {
            property: "industry_average_number_of_functional_units",
            name: eco("IndustryAverageNumberOfFunctionalUnits"),
            get: |u| opt_scalar(&u.industry_average_number_of_functional_units),
        },
        FieldDescriptor::Scalar {
            property: "utility",
            name: eco("Utility"),
            get: |u| opt_scalar(&u.utility),
        },
    ];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            industry_average_duration_years: fields.optional("industry_average_duration_years")?,
            industry_average_number_of_functional_units: fields
                .optional("industry_average_number_of_functional_units")?,
            utility: fields.optional("utility")?,
        })
    }
}

/// Expected life of a product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductLifeSpan {
    /// Product life in years
    pub duration_years: f64,
    /// Number of functional units delivered over the life
    pub number_of_functional_units: Option<f64>,
    /// Description of one functional unit
    pub functional_unit_description: Option<String>,
    /// Utility compared to the industry average
    pub utility: Option<UtilitySpecification>,
}

impl NodeType for ProductLifeSpan {
    const TYPE_NAME: &'static str = "ProductLifeSpan";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Scalar {
            property: "duration_years",
            name: eco("DurationYears"),
            get: |p| to_scalar(&p.duration_years),
        },
        FieldDescriptor::Scalar {
            property: "number_of_functional_units",
            name: eco("NumberOfFunctionalUnits"),
            get: |p| opt_scalar(&p.number_of_functional_units),
        },
        FieldDescriptor::Scalar {
            property: "functional_unit_description",
            name: eco("FunctionalUnitDescription"),
            get: |p| opt_scalar(&p.functional_unit_description),
        },
        FieldDescriptor::Single {
            child_type: UtilitySpecification::TYPE_NAME,
            property: "utility",
            name: eco("Utility"),
            get: |p| opt_node(&p.utility),
        },
    ];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            duration_years: fields.required("duration_years")?,
            number_of_functional_units: fields.optional("number_of_functional_units")?,
            functional_unit_description: fields.optional("functional_unit_description")?,
            utility: fields.single("utility")?,
        })
    }
}

/// How the product is used over its life
#[derive(Debug, Clone, PartialEq)]
pub struct UsePhase {
    /// Expected life of the product
    pub product_life_span: ProductLifeSpan,
    /// Electricity mix of the region of use
    pub electricity_mix: Option<ElectricityMix>,
    /// Static use, for energy-consuming products
    pub static_mode: Option<StaticMode>,
    /// Mobile use, for vehicles
    pub mobile_mode: Option<MobileMode>,
}

impl NodeType for UsePhase {
    const TYPE_NAME: &'static str = "UsePhase";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Single {
            child_type: ProductLifeSpan::TYPE_NAME,
            property: "product_life_span",
            name: eco("ProductLifeSpan"),
            get: |u| Some(&u.product_life_span as &dyn Node),
        },
        FieldDescriptor::Single {
            child_type: ElectricityMix::TYPE_NAME,
            property: "electricity_mix",
            name: eco("ElectricityMix"),
            get: |u| opt_node(&u.electricity_mix),
        },
        FieldDescriptor::Single {
            child_type: StaticMode::TYPE_NAME,
            property: "static_mode",
            name: eco("StaticMode"),
            get: |u| opt_node(&u.static_mode),
        },
        FieldDescriptor::Single {
            child_type: MobileMode::TYPE_NAME,
            property: "mobile_mode",
            name: eco("MobileMode"),
            get: |u| opt_node(&u.mobile_mode),
        },
    ];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            product_life_span: fields.required_single("product_life_span")?,
            electricity_mix: fields.single("electricity_mix")?,
            static_mode: fields.single("static_mode")?,
            mobile_mode: fields.single("mobile_mode")?,
        })
    }
}

/// Free-form notes about a BoM
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoMDetails {
    /// General notes
    pub notes: Option<String>,
    /// URL of a picture of the product
    pub picture_url: Option<String>,
    /// Product name
    pub product_name: Option<String>,
}

impl NodeType for BoMDetails {
    const TYPE_NAME: &'static str = "BoMDetails";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Scalar {
            property: "notes",
            name: eco("Notes"),
            get: |d| opt_scalar(&d.notes),
        },
        FieldDescriptor::Scalar {
            property: "picture_url",
            name: eco("PictureUrl"),
            get: |d| opt_scalar(&d.picture_url),
        },
        FieldDescriptor::Scalar {
            property: "product_name",
            name: eco("ProductName"),
            get: |d| opt_scalar(&d.product_name),
        },
    ];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            notes: fields.optional("notes")?,
            picture_url: fields.optional("picture_url")?,
            product_name: fields.optional("product_name")?,
        })
    }
}

/// One leg of transport the product or its parts go through
#[derive(Debug, Clone, PartialEq)]
pub struct TransportStage {
    /// Name of the stage
    pub name: String,
    /// Reference to the transport type record
    pub mi_transport_reference: ExtendedMIRecordReference,
    /// Distance covered
    pub distance: UnittedValue,
    /// Identity of the element within the BoM
    pub internal_id: Option<String>,
}

impl NodeType for TransportStage {
    const TYPE_NAME: &'static str = "TransportStage";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Scalar {
            property: "internal_id",
            name: eco("@id"),
            get: |t| opt_scalar(&t.internal_id),
        },
        FieldDescriptor::Scalar {
            property: "name",
            name: eco("Name"),
            get: |t| to_scalar(&t.name),
        },
        FieldDescriptor::Single {
            child_type: ExtendedMIRecordReference::TYPE_NAME,
            property: "mi_transport_reference",
            name: eco("MITransportReference"),
            get: |t| Some(&t.mi_transport_reference as &dyn Node),
        },
        FieldDescriptor::Single {
            child_type: UnittedValue::TYPE_NAME,
            property: "distance",
            name: eco("Distance"),
            get: |t| Some(&t.distance as &dyn Node),
        },
    ];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            name: fields.required("name")?,
            mi_transport_reference: fields.required_single("mi_transport_reference")?,
            distance: fields.required_single("distance")?,
            internal_id: fields.optional("internal_id")?,
        })
    }
}

/// A specification a part conforms to
#[derive(Debug, Clone, PartialEq)]
pub struct Specification {
    /// Reference to the specification record
    pub mi_specification_reference: ExtendedMIRecordReference,
    /// Amount of the part the specification applies to
    pub quantity: Option<UnittedValue>,
    /// Display identity
    pub identity: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Reference used by the producing application
    pub external_identity: Option<String>,
    /// Identity of the element within the BoM
    pub internal_id: Option<String>,
}

impl NodeType for Specification {
    const TYPE_NAME: &'static str = "Specification";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Scalar {
            property: "internal_id",
            name: eco("@id"),
            get: |s| opt_scalar(&s.internal_id),
        },
        FieldDescriptor::Single {
            child_type: ExtendedMIRecordReference::TYPE_NAME,
            property: "mi_specification_reference",
            name: eco("MISpecificationReference"),
            get: |s| Some(&s.mi_specification_reference as &dyn Node),
        },
        FieldDescriptor::Single {
            child_type: UnittedValue::TYPE_NAME,
            property: "quantity",
            name: eco("Quantity"),
            get: |s| opt_node(&s.quantity),
        },
        FieldDescriptor::Scalar {
            property: "identity",
            name: eco("Identity"),
            get: |s| opt_scalar(&s.identity),
        },
        FieldDescriptor::Scalar {
            property: "name",
            name: eco("Name"),
            get: |s| opt_scalar(&s.name),
        },
        FieldDescriptor::Scalar {
            property: "external_identity",
            name: eco("ExternalIdentity"),
            get: |s| opt_scalar(&s.external_identity),
        },
    ];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            mi_specification_reference: fields.required_single("mi_specification_reference")?,
            quantity: fields.single("quantity")?,
            identity: fields.optional("identity")?,
            name: fields.optional("name")?,
            external_identity: fields.optional("external_identity")?,
            internal_id: fields.optional("internal_id")?,
        })
    }
}

/// A substance contained in a part
#[derive(Debug, Clone, PartialEq)]
pub struct Substance {
    /// Reference to the substance record
    pub mi_substance_reference: ExtendedMIRecordReference,
    /// Share of the parent made up of this substance, in percent
    pub percentage: Option<f64>,
    /// How the substance is present
    pub category: Option<Category>,
    /// Display identity
    pub identity: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Reference used by the producing application
    pub external_identity: Option<String>,
    /// Identity of the element within the BoM
    pub internal_id: Option<String>,
}

impl NodeType for Substance {
    const TYPE_NAME: &'static str = "Substance";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Scalar {
            property: "internal_id",
            name: eco("@id"),
            get: |s| opt_scalar(&s.internal_id),
        },
        FieldDescriptor::Single {
            child_type: ExtendedMIRecordReference::TYPE_NAME,
            property: "mi_substance_reference",
            name: eco("MISubstanceReference"),
            get: |s| Some(&s.mi_substance_reference as &dyn Node),
        },
        FieldDescriptor::Scalar {
            property: "percentage",
            name: eco("Percentage"),
            get: |s| opt_scalar(&s.percentage),
        },
        FieldDescriptor::Scalar {
            property: "category",
            name: eco("Category"),
            get: |s| opt_scalar(&s.category),
        },
        FieldDescriptor::Scalar {
            property: "identity",
            name: eco("Identity"),
            get: |s| opt_scalar(&s.identity),
        },
        FieldDescriptor::Scalar {
            property: "name",
            name: eco("Name"),
            get: |s| opt_scalar(&s.name),
        },
        FieldDescriptor::Scalar {
            property: "external_identity",
            name: eco("ExternalIdentity"),
            get: |s| opt_scalar(&s.external_identity),
        },
    ];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            mi_substance_reference: fields.required_single("mi_substance_reference")?,
            percentage: fields.optional("percentage")?,
            category: fields.optional("category")?,
            identity: fields.optional("identity")?,
            name: fields.optional("name")?,
            external_identity: fields.optional("external_identity")?,
            internal_id: fields.optional("internal_id")?,
        })
    }
}

/// A manufacturing process applied to a part or material
///
/// Unlike 23/01, a process may name where it happens and the transport
/// leading up to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    /// Reference to the process record
    pub mi_process_reference: ExtendedMIRecordReference,
    /// How the amount affected is measured
    pub dimension_type: DimensionType,
    /// Share of the parent affected, in percent
    pub percentage: Option<f64>,
    /// Absolute amount affected
    pub quantity: Option<UnittedValue>,
    /// Display identity
    pub identity: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Reference used by the producing application
    pub external_identity: Option<String>,
    /// Identity of the element within the BoM
    pub internal_id: Option<String>,
    /// Where the work is done
    pub location: Option<Location>,
    /// Transport stages preceding this step
    pub transport_phase: Vec<TransportStage>,
}

impl NodeType for Process {
    const TYPE_NAME: &'static str = "Process";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Scalar {
            property: "internal_id",
            name: eco("@id"),
            get: |p| opt_scalar(&p.internal_id),
        },
        FieldDescriptor::Single {
            child_type: ExtendedMIRecordReference::TYPE_NAME,
            property: "mi_process_reference",
            name: eco("MIProcessReference"),
            get: |p| Some(&p.mi_process_reference as &dyn Node),
        },
        FieldDescriptor::Scalar {
            property: "dimension_type",
            name: eco("DimensionType"),
            get: |p| to_scalar(&p.dimension_type),
        },
        FieldDescriptor::Scalar {
            property: "percentage",
            name: eco("Percentage"),
            get: |p| opt_scalar(&p.percentage),
        },
        FieldDescriptor::Single {
            child_type: UnittedValue::TYPE_NAME,
            property: "quantity",
            name: eco("Quantity"),
            get: |p| opt_node(&p.quantity),
        },
        FieldDescriptor::Scalar {
            property: "identity",
            name: eco("Identity"),
            get: |p| opt_scalar(&p.identity),
        },
        FieldDescriptor::Scalar {
            property: "name",
            name: eco("Name"),
            get: |p| opt_scalar(&p.name),
        },
        FieldDescriptor::Scalar {
            property: "external_identity",
            name: eco("ExternalIdentity"),
            get: |p| opt_scalar(&p.external_identity),
        },
        FieldDescriptor::Single {
            child_type: Location::TYPE_NAME,
            property: "location",
            name: eco("Location"),
            get: |p| opt_node(&p.location),
        },
        FieldDescriptor::List {
            item_type: TransportStage::TYPE_NAME,
            property: "transport_phase",
            container: eco("TransportPhase"),
            item: eco("TransportStage"),
            get: |p| node_list(&p.transport_phase),
        },
    ];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            mi_process_reference: fields.required_single("mi_process_reference")?,
            dimension_type: fields.required("dimension_type")?,
            percentage: fields.optional("percentage")?,
            quantity: fields.single("quantity")?,
            identity: fields.optional("identity")?,
            name: fields.optional("name")?,
            external_identity: fields.optional("external_identity")?,
            internal_id: fields.optional("internal_id")?,
            location: fields.single("location")?,
            transport_phase: fields.list("transport_phase")?,
        })
    }
}

const RECYCLE_CONTENT: QualifiedName<'static> = eco("RecycleContent");
const PERCENTAGE: QualifiedName<'static> = eco("Percentage");

/// A material making up a part
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Reference to the material record
    pub mi_material_reference: ExtendedMIRecordReference,
    /// Share of the part made of this material, in percent
    pub percentage: Option<f64>,
    /// Mass of this material in the part
    pub mass: Option<UnittedValue>,
    /// Recycled content when it differs from the typical value, in percent
    pub recycle_content_percentage: Option<f64>,
    /// Processes applied to the material
    pub processes: Vec<Process>,
    /// Fates of the material at end of life
    pub end_of_life_fates: Vec<EndOfLifeFate>,
    /// Display identity
    pub identity: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Reference used by the producing application
    pub external_identity: Option<String>,
    /// Identity of the element within the BoM
    pub internal_id: Option<String>,
}

impl NodeType for Material {
    const TYPE_NAME: &'static str = "Material";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Scalar {
            property: "internal_id",
            name: eco("@id"),
            get: |m| opt_scalar(&m.internal_id),
        },
        FieldDescriptor::Single {
            child_type: ExtendedMIRecordReference::TYPE_NAME,
            property: "mi_material_reference",
            name: eco("MIMaterialReference"),
            get: |m| Some(&m.mi_material_reference as &dyn Node),
        },
        FieldDescriptor::Scalar {
            property: "percentage",
            name: PERCENTAGE,
            get: |m| opt_scalar(&m.percentage),
        },
        FieldDescriptor::Single {
            child_type: UnittedValue::TYPE_NAME,
            property: "mass",
            name: eco("Mass"),
            get: |m| opt_node(&m.mass),
        },
        FieldDescriptor::List {
            item_type: Process::TYPE_NAME,
            property: "processes",
            container: eco("Processes"),
            item: eco("Process"),
            get: |m| node_list(&m.processes),
        },
        FieldDescriptor::List {
            item_type: EndOfLifeFate::TYPE_NAME,
            property: "end_of_life_fates",
            container: eco("EndOfLifeFates"),
            item: eco("EndOfLifeFate"),
            get: |m| node_list(&m.end_of_life_fates),
        },
        FieldDescriptor::Scalar {
            property: "identity",
            name: eco("Identity"),
            get: |m| opt_scalar(&m.identity),
        },
        FieldDescriptor::Scalar {
            property: "name",
            name: eco("Name"),
            get: |m| opt_scalar(&m.name),
        },
        FieldDescriptor::Scalar {
            property: "external_identity",
            name: eco("ExternalIdentity"),
            get: |m| opt_scalar(&m.external_identity),
        },
    ];
    const CUSTOM_FIELDS: &'static [CustomField] =
        &[CustomField::new("recycle_content_percentage", RECYCLE_CONTENT)];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            mi_material_reference: fields.required_single("mi_material_reference")?,
            percentage: fields.optional("percentage")?,
            mass: fields.single("mass")?,
            recycle_content_percentage: fields.optional("recycle_content_percentage")?,
            processes: fields.list("processes")?,
            end_of_life_fates: fields.list("end_of_life_fates")?,
            identity: fields.optional("identity")?,
            name: fields.optional("name")?,
            external_identity: fields.optional("external_identity")?,
            internal_id: fields.optional("internal_id")?,
        })
    }

    fn custom_read(doc: &Document, reader: &Reader<'_>) -> Result<FieldSet> {
        let mut fields = FieldSet::new(Self::TYPE_NAME);
        if let Some(recycle) = reader.get_wrapper(Self::TYPE_NAME, doc, &RECYCLE_CONTENT)? {
            if let Some(percentage) = reader.get_field(recycle, &PERCENTAGE)? {
                fields.insert_scalar("recycle_content_percentage", percentage.clone())?;
            }
        }
        Ok(fields)
    }

    fn custom_write(&self, out: &mut Document, writer: &Writer<'_>) -> Result<()> {
        if let Some(percentage) = self.recycle_content_percentage {
            let mut recycle = Document::new();
            recycle.insert(
                writer.key(&PERCENTAGE)?,
                writer.scalar(Self::TYPE_NAME, "recycle_content_percentage", &percentage)?,
            );
            out.insert(writer.key(&RECYCLE_CONTENT)?, Value::Object(recycle));
        }
        Ok(())
    }
}

const ROHS_EXEMPTIONS: QualifiedName<'static> = eco("RohsExemptions");
const ROHS_EXEMPTION: QualifiedName<'static> = eco("RohsExemption");

/// A part, possibly made of further parts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Part {
    /// Part number
    pub part_number: String,
    /// Quantity used in the parent
    pub quantity: Option<UnittedValue>,
    /// Mass per unit of the quantity
    pub mass_per_unit_of_measure: Option<UnittedValue>,
    /// Volume per unit of the quantity
    pub volume_per_unit_of_measure: Option<UnittedValue>,
    /// Reference to a part record
    pub mi_part_reference: Option<ExtendedMIRecordReference>,
    /// Reference to a part held in another system, for information only
    pub non_mi_part_reference: Option<String>,
    /// Display name
    pub part_name: Option<String>,
    /// Reference used by the producing application
    pub external_identity: Option<String>,
    /// Sub-parts
    pub components: Vec<Part>,
    /// Specifications the part conforms to
    pub specifications: Vec<Specification>,
    /// Constituent materials
    pub materials: Vec<Material>,
    /// Contained substances
    pub substances: Vec<Substance>,
    /// Manufacturing processes
    pub processes: Vec<Process>,
    /// Justifications for RoHS exemptions
    pub rohs_exemptions: Vec<String>,
    /// Fates of the part at end of life
    pub end_of_life_fates: Vec<EndOfLifeFate>,
    /// Identity of the element within the BoM
    pub internal_id: Option<String>,
    /// Where the work is done
    pub location: Option<Location>,
    /// Transport stages preceding this step
    pub transport_phase: Vec<TransportStage>,
}

impl Part {
    /// Create a part with only its part number
    pub fn new(part_number: impl Into<String>) -> Self {
        Self {
            part_number: part_number.into(),
            ..Self::default()
        }
    }
}

impl NodeType for Part {
    const TYPE_NAME: &'static str = "Part";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Scalar {
            property: "internal_id",
            name: eco("@id"),
            get: |p| opt_scalar(&p.internal_id),
        },
        FieldDescriptor::Single {
            child_type: UnittedValue::TYPE_NAME,
            property: "quantity",
            name: eco("Quantity"),
            get: |p| opt_node(&p.quantity),
        },
        FieldDescriptor::Single {
            child_type: UnittedValue::TYPE_NAME,
            property: "mass_per_unit_of_measure",
            name: eco("MassPerUom"),
            get: |p| opt_node(&p.mass_per_unit_of_measure),
        },
        FieldDescriptor::Single {
            child_type: UnittedValue::TYPE_NAME,
            property: "volume_per_unit_of_measure",
            name: eco("VolumePerUom"),
            get: |p| opt_node(&p.volume_per_unit_of_measure),
        },
        FieldDescriptor::Single {
            child_type: ExtendedMIRecordReference::TYPE_NAME,
            property: "mi_part_reference",
            name: eco("MIPartReference"),
            get: |p| opt_node(&p.mi_part_reference),
        },
        FieldDescriptor::Scalar {
            property: "non_mi_part_reference",
            name: eco("NonMIPartReference"),
            get: |p| opt_scalar(&p.non_mi_part_reference),
        },
        FieldDescriptor::Scalar {
            property: "part_number",
            name: eco("PartNumber"),
            get: |p| to_scalar(&p.part_number),
        },
        FieldDescriptor::Scalar {
            property: "part_name",
            name: eco("Name"),
            get: |p| opt_scalar(&p.part_name),
        },
        FieldDescriptor::Scalar {
            property: "external_identity",
            name: eco("ExternalIdentity"),
            get: |p| opt_scalar(&p.external_identity),
        },
        FieldDescriptor::List {
            item_type: Part::TYPE_NAME,
            property: "components",
            container: eco("Components"),
            item: eco("Part"),
            get: |p| node_list(&p.components),
        },
        FieldDescriptor::List {
            item_type: Specification::TYPE_NAME,
            property: "specifications",
            container: eco("Specifications"),
            item: eco("Specification"),
            get: |p| node_list(&p.specifications),
        },
        FieldDescriptor::List {
            item_type: Material::TYPE_NAME,
            property: "materials",
            container: eco("Materials"),
            item: eco("Material"),
            get: |p| node_list(&p.materials),
        },
        FieldDescriptor::List {
            item_type: Substance::TYPE_NAME,
            property: "substances",
            container: eco("Substances"),
            item: eco("Substance"),
            get: |p| node_list(&p.substances),
        },
        FieldDescriptor::List {
            item_type: Process::TYPE_NAME,
            property: "processes",
            container: eco("Processes"),
            item: eco("Process"),
            get: |p| node_list(&p.processes),
        },
        FieldDescriptor::List {
            item_type: EndOfLifeFate::TYPE_NAME,
            property: "end_of_life_fates",
            container: eco("EndOfLifeFates"),
            item: eco("EndOfLifeFate"),
            get: |p| node_list(&p.end_of_life_fates),
        },
        FieldDescriptor::Single {
            child_type: Location::TYPE_NAME,
            property: "location",
            name: eco("Location"),
            get: |p| opt_node(&p.location),
        },
        FieldDescriptor::List {
            item_type: TransportStage::TYPE_NAME,
            property: "transport_phase",
            container: eco("TransportPhase"),
            item: eco("TransportStage"),
            get: |p| node_list(&p.transport_phase),
        },
    ];
    const CUSTOM_FIELDS: &'static [CustomField] =
        &[CustomField::new("rohs_exemptions", ROHS_EXEMPTIONS)];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            part_number: fields.required("part_number")?,
            quantity: fields.single("quantity")?,
            mass_per_unit_of_measure: fields.single("mass_per_unit_of_measure")?,
            volume_per_unit_of_measure: fields.single("volume_per_unit_of_measure")?,
            mi_part_reference: fields.single("mi_part_reference")?,
            non_mi_part_reference: fields.optional("non_mi_part_reference")?,
            part_name: fields.optional("part_name")?,
            external_identity: fields.optional("external_identity")?,
            components: fields.list("components")?,
            specifications: fields.list("specifications")?,
            materials: fields.list("materials")?,
            substances: fields.list("substances")?,
            processes: fields.list("processes")?,
            rohs_exemptions: fields.scalar_list("rohs_exemptions")?,
            end_of_life_fates: fields.list("end_of_life_fates")?,
            internal_id: fields.optional("internal_id")?,
            location: fields.single("location")?,
            transport_phase: fields.list("transport_phase")?,
        })
    }

    fn custom_read(doc: &Document, reader: &Reader<'_>) -> Result<FieldSet> {
        let mut fields = FieldSet::new(Self::TYPE_NAME);
        if let Some(exemptions) = reader.get_wrapper(Self::TYPE_NAME, doc, &ROHS_EXEMPTIONS)? {
            if let Some(items) = reader.get_field(exemptions, &ROHS_EXEMPTION)? {
                fields.insert_scalar("rohs_exemptions", items.clone())?;
            }
        }
        Ok(fields)
    }

    fn custom_write(&self, out: &mut Document, writer: &Writer<'_>) -> Result<()> {
        if self.rohs_exemptions.is_empty() {
            return Ok(());
        }
        let items = self.rohs_exemptions.iter().map(|e| e.to_value()).collect();
        let mut exemptions = Document::new();
        exemptions.insert(writer.key(&ROHS_EXEMPTION)?, Value::Array(items));
        out.insert(writer.key(&ROHS_EXEMPTIONS)?, Value::Object(exemptions));
        Ok(())
    }
}

/// Root of a 25/05 BoM document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillOfMaterials {
    /// Top-level parts
    pub components: Vec<Part>,
    /// Transport stages the parts go through
    pub transport_phase: Vec<TransportStage>,
    /// How the product is used
    pub use_phase: Option<UsePhase>,
    /// Where the product is assembled
    pub location: Option<Location>,
    /// Notes about the BoM
    pub notes: Option<BoMDetails>,
    /// Identity of the element within the BoM
    pub internal_id: Option<String>,
}

impl BillOfMaterials {
    /// Create a BoM holding the given top-level parts
    pub fn new(components: Vec<Part>) -> Self {
        Self {
            components,
            ..Self::default()
        }
    }
}

impl NodeType for BillOfMaterials {
    const TYPE_NAME: &'static str = "BillOfMaterials";
    const NAMESPACE: &'static str = NAMESPACE;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::Scalar {
            property: "internal_id",
            name: eco("@id"),
            get: |b| opt_scalar(&b.internal_id),
        },
        FieldDescriptor::List {
            item_type: Part::TYPE_NAME,
            property: "components",
            container: eco("Components"),
            item: eco("Part"),
            get: |b| node_list(&b.components),
        },
        FieldDescriptor::List {
            item_type: TransportStage::TYPE_NAME,
            property: "transport_phase",
            container: eco("TransportPhase"),
            item: eco("TransportStage"),
            get: |b| node_list(&b.transport_phase),
        },
        FieldDescriptor::Single {
            child_type: UsePhase::TYPE_NAME,
            property: "use_phase",
            name: eco("UsePhase"),
            get: |b| opt_node(&b.use_phase),
        },
        FieldDescriptor::Single {
            child_type: Location::TYPE_NAME,
            property: "location",
            name: eco("Location"),
            get: |b| opt_node(&b.location),
        },
        FieldDescriptor::Single {
            child_type: BoMDetails::TYPE_NAME,
            property: "notes",
            name: eco("Notes"),
            get: |b| opt_node(&b.notes),
        },
    ];

    fn from_fields(mut fields: FieldSet) -> Result<Self> {
        Ok(Self {
            components: fields.list("components")?,
            transport_phase: fields.list("transport_phase")?,
            use_phase: fields.single("use_phase")?,
            location: fields.single("location")?,
            notes: fields.single("notes")?,
            internal_id: fields.optional("internal_id")?,
        })
    }
}

/// Register the 25/05 document types and the base types they use
pub fn register(registry: &mut TypeRegistry) {
    gbt1205::register(registry);
    registry.register::<ExtendedMIRecordReference>();
    registry.register::<EndOfLifeFate>();
    registry.register::<UnittedValue>();
    registry.register::<Location>();
    registry.register::<ElectricityMix>();
    registry.register::<MobileMode>();
    registry.register::<StaticMode>();
    registry.register::<UtilitySpecification>();
    registry.register::<ProductLifeSpan>();
    registry.register::<UsePhase>();
    registry.register::<BoMDetails>();
    registry.register::<TransportStage>();
    registry.register::<Specification>();
    registry.register::<Substance>();
    registry.register::<Process>();
    registry.register::<Material>();
    registry.register::<Part>();
    registry.register::<BillOfMaterials>();
}
