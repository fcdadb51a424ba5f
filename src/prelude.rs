//! Prelude module for common imports

pub use crate::api::{
    ApiError, ApiResult, ApplicationApi, ExecutionResponse, ExecutionStatus, GateClient, JsonMap,
    PipelineApi, PipelineConfig, PublishTemplateOptions, RetrofitErrorResponse, SessionApi,
    TaskApi, TaskRef, TemplateApi, TemplatedPipelineErrorResponse,
};
pub use crate::ops::{
    MonitorOptions, PlanReport, TaskReport, TaskRunner, create_application, delete_application,
    delete_template, plan, publish_template, save_pipeline, save_templated_pipeline,
};
pub use crate::task::{FailureDetail, TaskOutcome, TaskPoller, extract_retrofit_error, interpret};
pub use crate::transport::{ClientConfig, ReqwestTransport, TlsIdentity, Transport};
