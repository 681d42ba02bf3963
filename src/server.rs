//! MCP server exposing the location tools and the category code resource.

use rmcp::handler::server::{router::tool::ToolRouter, wrapper::Parameters};
use rmcp::model::{
    AnnotateAble, Implementation, ListResourcesResult, PaginatedRequestParam, RawResource,
    ReadResourceRequestParam, ReadResourceResult, Resource, ResourceContents, ServerCapabilities,
    ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::json;

use crate::client::LocalClient;
use crate::model::CategoryGroupCode;
use crate::tools::{
    FindCoordinatesArgs, GetPlaceArgs, LocationTools, SearchByCategoryArgs, SearchByKeywordArgs,
};

pub const SERVER_NAME: &str = "kakao-local-mcp";
pub const CATEGORY_GROUP_CODE_URI: &str = "resource://category_group_code";

pub const INSTRUCTIONS: &str = "\
Kakao Local MCP provides tools for retrieving location information within South Korea.
Available tools are listed in <tools> and resources are listed in <resources>. You must follow all <rules>.

<tools>
- find_coordinates: Finds the coordinates of a given [address]. The response contains a list of [document],
  each of which includes the matched address ([address_name]), longitude ([x]), and latitude ([y]).
- search_by_keyword: Searches for places related to the keyword. Users can provide [category_group_code],
  [center_coordinate], and [radius_from_center] to narrow down the search results.
- search_by_category: Searches for places with matching category group code.
- get_place: Fetches details for a place such as name, address, reviews, photos and etc. The [place_id] parameter
  corresponds to a document ID from the location search results.
</tools>

<resources>
- resource://category_group_code: Returns all category group codes supported by Kakao Local API
</resources>

<rules>
- If the response contains [meta], which is the metadata of a result, you can get paging information from response.
  [is_end] is a boolean value indicating whether a returned page is the last one. If a user wants to get more results,
  you can call the same tool with an increased [page], if supported, unless the last result is the last page.
- When making consecutive calls to the same MCP tool, wait for a random duration selected between 0 ms and 50ms and
  use exponential backoff between calls.
- [category_group_code] must be one of [CategoryGroupCode] names (available in <resources>). Values of
  [CategoryGroupCode] are descriptions, which cannot be used in <tools>.
- If a tool result has [success] set to false, [error] explains what went wrong.
</rules>";

/// MCP handler for the Kakao Local tools.
#[derive(Clone)]
pub struct KakaoLocalServer {
    tools: LocationTools,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl KakaoLocalServer {
    pub fn new(client: LocalClient) -> Self {
        Self {
            tools: LocationTools::new(client),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Find coordinates of a given address")]
    async fn find_coordinates(&self, Parameters(args): Parameters<FindCoordinatesArgs>) -> String {
        self.tools.find_coordinates(args).await.to_json()
    }

    #[tool(description = "Searches for places related to the keyword")]
    async fn search_by_keyword(
        &self,
        Parameters(args): Parameters<SearchByKeywordArgs>,
    ) -> String {
        self.tools.search_by_keyword(args).await.to_json()
    }

    #[tool(description = "Searches for places with matching category group code")]
    async fn search_by_category(
        &self,
        Parameters(args): Parameters<SearchByCategoryArgs>,
    ) -> String {
        self.tools.search_by_category(args).await.to_json()
    }

    #[tool(
        description = "Fetches details for a place such as name, address, reviews, photos and etc"
    )]
    async fn get_place(&self, Parameters(args): Parameters<GetPlaceArgs>) -> String {
        self.tools.get_place(args).await.to_json()
    }
}

impl KakaoLocalServer {
    /// Names of the registered tools.
    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.into_owned())
            .collect()
    }

    fn category_group_code_resource() -> Resource {
        let mut raw = RawResource::new(CATEGORY_GROUP_CODE_URI, "CategoryGroupCode".to_string());
        raw.description = Some("Get all category group codes".to_string());
        raw.mime_type = Some("application/json".to_string());
        raw.no_annotation()
    }
}

/// JSON text of the `code -> description` table.
pub fn category_group_code_json() -> String {
    serde_json::Value::Object(CategoryGroupCode::reference_table()).to_string()
}

#[tool_handler]
impl ServerHandler for KakaoLocalServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(vec![
            Self::category_group_code_resource(),
        ]))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let uri = request.uri;
        if uri != CATEGORY_GROUP_CODE_URI {
            return Err(McpError::resource_not_found(
                "resource_not_found",
                Some(json!({ "uri": uri })),
            ));
        }

        tracing::debug!("serving {}", CATEGORY_GROUP_CODE_URI);
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(category_group_code_json(), uri)],
        })
    }
}
