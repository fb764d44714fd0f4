//! Well-known label names of the Frank Sign annotation schema.

pub const EAR_OUTER_CONTOUR: &str = "ear_outer_contour";
pub const FRANKS_SIGN_REGION: &str = "franks_sign_region";
pub const FRANKS_SIGN_LINE: &str = "franks_sign_line";

// Anatomical landmarks (point annotations).
pub const EAR_CANAL_CENTER: &str = "ear_canal_center";
pub const TRAGUS_POINT: &str = "tragus_point";
pub const ANTITRAGUS_POINT: &str = "antitragus_point";
pub const ANTITRAGUS_END_POINT: &str = "antitragus_end_point";
pub const INTERTRAGIC_NOTCH: &str = "intertragic_notch";
pub const EARLOBE_TIP: &str = "earlobe_tip";
pub const EAR_TOP: &str = "ear_top";
pub const EARLOBE_ATTACHMENT_POINT: &str = "earlobe_attachment_point";

// Per-image metadata flags (point annotations carrying attributes).
pub const IMAGE_QUALITY_ASSESSMENT: &str = "image_quality_assessment";
pub const ANNOTATION_METADATA: &str = "annotation_metadata";
pub const PATIENT_METADATA: &str = "patient_metadata";
