//! Vocabulary used for resource descriptions and provenance

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";

pub const OWL_RESTRICTION: &str = "http://www.w3.org/2002/07/owl#Restriction";
pub const OWL_ON_PROPERTY: &str = "http://www.w3.org/2002/07/owl#onProperty";
pub const OWL_SOME_VALUES_FROM: &str = "http://www.w3.org/2002/07/owl#someValuesFrom";
pub const OWL_ALL_VALUES_FROM: &str = "http://www.w3.org/2002/07/owl#allValuesFrom";
pub const OWL_HAS_VALUE: &str = "http://www.w3.org/2002/07/owl#hasValue";

pub const DCAT_DOWNLOAD_URL: &str = "http://www.w3.org/ns/dcat#downloadURL";
pub const DCAT_MEDIA_TYPE: &str = "http://www.w3.org/ns/dcat#mediaType";

/// OTE I/O namespace
pub const OTEIO: &str = "https://w3id.org/emmo/domain/oteio#";
pub const OTEIO_DATA_RESOURCE: &str = "https://w3id.org/emmo/domain/oteio#DataResource";
pub const OTEIO_HAS_CONFIGURATION: &str = "https://w3id.org/emmo/domain/oteio#hasConfiguration";
pub const OTEIO_METADATA: &str = "https://w3id.org/emmo/domain/oteio#metadata";
pub const OTEIO_DRIVER: &str = "https://w3id.org/emmo/domain/oteio#driver";
pub const OTEIO_OPTIONS: &str = "https://w3id.org/emmo/domain/oteio#options";

pub const PROV_WAS_GENERATED_BY: &str = "http://www.w3.org/ns/prov#wasGeneratedBy";
pub const PROV_WAS_DERIVED_FROM: &str = "http://www.w3.org/ns/prov#wasDerivedFrom";
pub const PROV_GENERATED_AT_TIME: &str = "http://www.w3.org/ns/prov#generatedAtTime";

/// EMMO `hasInput`
pub const HAS_INPUT: &str = "https://w3id.org/emmo#EMMO_36e69413_8c59_4799_946c_10b05d266e22";

pub const XSD_ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
