//! Domain records exchanged with the admin API

mod auth;
mod college;
pub(crate) mod decode;
mod form;
mod gallery;
mod inquiry;
mod media;
mod program;

pub use auth::{Credentials, LoginResponse, MessageResponse, PLACEHOLDER_IDENTITY};
pub use college::{
    College, CollegeInput, CollegeMediaUpdate, CollegeRef, CollegeSummary, Contact, Event,
    Faculty, Location, MediaUploadResponse, ProgramRef,
};
pub use form::{BestTime, FormSubmission, FormSubmissionInput};
pub(crate) use form::FormList;
pub use gallery::{Envelope, GalleryImage, GalleryUpload};
pub use inquiry::{Inquiry, InquiryInput};
pub use media::Attachment;
pub use program::{Program, ProgramInput};
