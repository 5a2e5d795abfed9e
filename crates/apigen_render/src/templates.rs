//! XML and script templates.
//!
//! Values are inserted verbatim. Nothing here escapes or validates input.

use crate::flow::{stage_for, FlowStage};
use apigen_intent::{spike_rate, PolicyKind, PolicySet};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Step invoked by the invalid-key fault rule. Not generated.
pub const INVALID_KEY_STEP: &str = "AM-InvalidAPIKey";

/// Step invoked by the default fault rule. Not generated.
pub const GENERIC_ERROR_STEP: &str = "AM-GenericError";

/// Words in a transformation intent that select the name-combination script.
const NAME_COMBINATION_WORDS: [&str; 4] = ["combine", "firstname", "lastname", "fullname"];

/// Renders the top-level `APIProxy` descriptor.
#[must_use]
pub fn proxy_xml(name: &str, policies: &PolicySet) -> String {
    let mut xml = format!(
        "{XML_DECL}\n<APIProxy name=\"{name}\">\n  <Description>Auto-generated proxy: {name}</Description>\n  <DisplayName>{name}</DisplayName>\n"
    );

    if policies.is_empty() {
        xml.push_str("  <Policies/>\n");
    } else {
        xml.push_str("  <Policies>\n");
        for policy in policies {
            xml.push_str(&format!("    <Policy>{policy}</Policy>\n"));
        }
        xml.push_str("  </Policies>\n");
    }

    xml.push_str(
        "  <ProxyEndpoints>
    <ProxyEndpoint>default</ProxyEndpoint>
  </ProxyEndpoints>
  <Resources/>
  <TargetEndpoints>
    <TargetEndpoint>default</TargetEndpoint>
  </TargetEndpoints>
</APIProxy>",
    );
    xml
}

/// Renders the `default` proxy endpoint with policy steps placed by stage.
#[must_use]
pub fn endpoint_xml(name: &str, base_path: &str, policies: &PolicySet) -> String {
    let steps = |stage: FlowStage| -> Vec<&PolicyKind> {
        policies
            .iter()
            .filter(|kind| stage_for(kind) == Some(stage))
            .collect()
    };

    let mut xml = format!(
        "{XML_DECL}\n<ProxyEndpoint name=\"default\">\n  <Description>{name} proxy endpoint</Description>\n"
    );

    if policies.contains(&PolicyKind::VerifyApiKey) {
        xml.push_str(&format!(
            r#"  <FaultRules>
    <FaultRule name="InvalidAPIKey">
      <Step>
        <Name>{INVALID_KEY_STEP}</Name>
      </Step>
      <Condition>(fault.name Matches "InvalidApiKeyForGivenResource") or (fault.name Matches "InvalidApiKey")</Condition>
    </FaultRule>
  </FaultRules>
  <DefaultFaultRule name="defaultRule">
    <Step>
      <Name>{GENERIC_ERROR_STEP}</Name>
    </Step>
  </DefaultFaultRule>
"#
        ));
    }

    xml.push_str("  <PreFlow name=\"PreFlow\">\n");
    xml.push_str(&step_block("Request", &steps(FlowStage::RequestPreFlow)));
    xml.push_str("    <Response/>\n  </PreFlow>\n");

    xml.push_str("  <PostFlow name=\"PostFlow\">\n    <Request/>\n");
    xml.push_str(&step_block("Response", &steps(FlowStage::ResponsePostFlow)));
    xml.push_str("  </PostFlow>\n");

    xml.push_str(&format!(
        r#"  <Flows>
    <Flow name="MainFlow">
      <Description>Main API flow</Description>
      <Request/>
      <Response/>
      <Condition>proxy.pathsuffix MatchesPath "/**"</Condition>
    </Flow>
  </Flows>
  <HTTPProxyConnection>
    <BasePath>{base_path}</BasePath>
    <Properties/>
  </HTTPProxyConnection>
  <RouteRule name="default">
    <TargetEndpoint>default</TargetEndpoint>
  </RouteRule>
</ProxyEndpoint>"#
    ));
    xml
}

fn step_block(element: &str, steps: &[&PolicyKind]) -> String {
    if steps.is_empty() {
        return format!("    <{element}/>\n");
    }
    let mut block = format!("    <{element}>\n");
    for step in steps {
        block.push_str(&format!(
            "      <Step>\n        <Name>{step}</Name>\n      </Step>\n"
        ));
    }
    block.push_str(&format!("    </{element}>\n"));
    block
}

/// Renders the `default` target endpoint.
#[must_use]
pub fn target_xml(target_url: &str) -> String {
    let url = clean_url(target_url);
    format!(
        r#"{XML_DECL}
<TargetEndpoint name="default">
  <Description>Default target endpoint</Description>
  <PreFlow name="PreFlow">
    <Request/>
    <Response/>
  </PreFlow>
  <PostFlow name="PostFlow">
    <Request/>
    <Response/>
  </PostFlow>
  <Flows/>
  <HTTPTargetConnection>
    <URL>{url}</URL>
    <Properties/>
  </HTTPTargetConnection>
</TargetEndpoint>"#
    )
}

fn clean_url(target_url: &str) -> &str {
    target_url
        .trim()
        .trim_end_matches(['.', ',', ';', ' '])
}

/// Renders one policy descriptor.
///
/// The spike arrest rate is derived from `request` at render time.
#[must_use]
pub fn policy_xml(kind: &PolicyKind, request: &str) -> String {
    let body = match kind {
        PolicyKind::VerifyApiKey => VERIFY_API_KEY.to_string(),
        PolicyKind::JavaScript => JAVASCRIPT.to_string(),
        PolicyKind::AssignMessage => ASSIGN_MESSAGE.to_string(),
        PolicyKind::Cors => CORS.to_string(),
        PolicyKind::Quota => QUOTA.to_string(),
        PolicyKind::SpikeArrest => format!(
            r#"<SpikeArrest async="false" continueOnError="false" enabled="true" name="SpikeArrest">
  <DisplayName>Spike Arrest</DisplayName>
  <Rate>{}</Rate>
  <UseEffectiveCount>true</UseEffectiveCount>
</SpikeArrest>"#,
            spike_rate(request)
        ),
        PolicyKind::Other(name) => format!(
            "<{name} name=\"{name}\">\n  <DisplayName>{name}</DisplayName>\n</{name}>"
        ),
    };
    format!("{XML_DECL}\n{body}")
}

const VERIFY_API_KEY: &str = r#"<VerifyAPIKey async="false" continueOnError="false" enabled="true" name="VerifyAPIKey">
  <DisplayName>Verify API Key</DisplayName>
  <APIKey ref="request.queryparam.apikey"/>
</VerifyAPIKey>"#;

const JAVASCRIPT: &str = r#"<Javascript async="false" continueOnError="false" enabled="true" name="JavaScript">
  <DisplayName>JavaScript Transformation</DisplayName>
  <ResourceURL>jsc://transformation.js</ResourceURL>
</Javascript>"#;

const ASSIGN_MESSAGE: &str = r#"<AssignMessage continueOnError="false" enabled="true" name="AssignMessage">
  <DisplayName>Assign Message</DisplayName>
  <Properties/>
  <Set>
    <Headers>
      <Header name="X-Processed-By">Apigee</Header>
    </Headers>
  </Set>
  <AssignVariable>
    <Name>request.timestamp</Name>
    <Value>{system.timestamp}</Value>
  </AssignVariable>
  <IgnoreUnresolvedVariables>true</IgnoreUnresolvedVariables>
  <AssignTo createNew="false" transport="http" type="request"/>
</AssignMessage>"#;

const CORS: &str = r#"<CORS async="false" continueOnError="false" enabled="true" name="CORS">
  <DisplayName>CORS Policy</DisplayName>
  <AllowOrigins>*</AllowOrigins>
  <AllowMethods>GET,POST,PUT,DELETE,OPTIONS</AllowMethods>
  <AllowHeaders>Content-Type,Authorization,X-Requested-With</AllowHeaders>
  <MaxAge>3628800</MaxAge>
  <AllowCredentials>false</AllowCredentials>
  <GeneratePreflightResponse>true</GeneratePreflightResponse>
</CORS>"#;

const QUOTA: &str = r#"<Quota async="false" continueOnError="false" enabled="true" name="Quota">
  <DisplayName>Quota Policy</DisplayName>
  <Allow count="1000"/>
  <Interval>1</Interval>
  <TimeUnit>hour</TimeUnit>
  <Identifier ref="client_id"/>
  <Distributed>true</Distributed>
  <Synchronous>true</Synchronous>
</Quota>"#;

/// Script combining `firstName` and `lastName` into `fullName`.
pub const NAME_COMBINATION_SCRIPT: &str = r"// Combine firstName and lastName into fullName
    try {
        var responseContent = context.getVariable('response.content');
        if (!responseContent) return;

        var data = JSON.parse(responseContent);

        if (data.firstName && data.lastName) {
            data.fullName = data.firstName + ' ' + data.lastName;
        }

        context.setVariable('response.content', JSON.stringify(data));

    } catch (e) {
        context.setVariable('transformation.error', e.message);
    }";

/// Renders the JavaScript resource for a transformation intent.
#[must_use]
pub fn script_js(transformation_intent: &str) -> String {
    let lower = transformation_intent.to_lowercase();
    if NAME_COMBINATION_WORDS.iter().any(|w| lower.contains(w)) {
        return NAME_COMBINATION_SCRIPT.to_string();
    }

    format!(
        r"// Custom transformation: {transformation_intent}
    try {{
        var responseContent = context.getVariable('response.content');
        if (!responseContent) return;

        var data = JSON.parse(responseContent);

        // Implement custom logic for: {transformation_intent}
        data.transformed = true;

        context.setVariable('response.content', JSON.stringify(data));

    }} catch (e) {{
        context.setVariable('transformation.error', e.message);
    }}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(kinds: &[PolicyKind]) -> PolicySet {
        kinds.iter().cloned().collect()
    }

    #[test]
    fn proxy_lists_policies_and_default_endpoints() {
        let xml = proxy_xml("orders", &set(&[PolicyKind::Cors, PolicyKind::Quota]));
        assert!(xml.starts_with(XML_DECL));
        assert!(xml.contains(r#"<APIProxy name="orders">"#));
        assert!(xml.contains("    <Policy>CORS</Policy>\n    <Policy>Quota</Policy>\n"));
        assert_eq!(xml.matches("<ProxyEndpoint>default</ProxyEndpoint>").count(), 1);
        assert_eq!(xml.matches("<TargetEndpoint>default</TargetEndpoint>").count(), 1);
    }

    #[test]
    fn proxy_without_policies_has_empty_list() {
        let xml = proxy_xml("bare", &PolicySet::new());
        assert!(xml.contains("  <Policies/>\n"));
        assert!(!xml.contains("<Policy>"));
    }

    #[test]
    fn endpoint_places_steps_by_stage() {
        let xml = endpoint_xml(
            "orders",
            "/orders",
            &set(&[PolicyKind::JavaScript, PolicyKind::Cors, PolicyKind::SpikeArrest]),
        );

        let pre = xml.find(r#"<PreFlow name="PreFlow">"#).unwrap();
        let post = xml.find(r#"<PostFlow name="PostFlow">"#).unwrap();
        let cors = xml.find("<Name>CORS</Name>").unwrap();
        let spike = xml.find("<Name>SpikeArrest</Name>").unwrap();
        let js = xml.find("<Name>JavaScript</Name>").unwrap();

        assert!(pre < cors && cors < spike && spike < post);
        assert!(js > post);
        assert!(xml.contains("<BasePath>/orders</BasePath>"));
        assert!(!xml.contains("<FaultRules>"));
    }

    #[test]
    fn endpoint_with_api_key_wires_fault_rules() {
        let xml = endpoint_xml("secure", "/secure", &set(&[PolicyKind::VerifyApiKey]));
        assert!(xml.contains("<FaultRules>"));
        assert!(xml.contains("<Name>AM-InvalidAPIKey</Name>"));
        assert!(xml.contains(r#"<DefaultFaultRule name="defaultRule">"#));
        assert!(xml.contains("<Name>AM-GenericError</Name>"));
    }

    #[test]
    fn endpoint_omits_unplaced_kinds_from_flows() {
        let xml = endpoint_xml("x", "/x", &set(&[PolicyKind::Other("OAuthV2".into())]));
        assert!(!xml.contains("OAuthV2"));
        assert!(xml.contains("    <Request/>\n    <Response/>\n  </PreFlow>"));
    }

    #[test]
    fn endpoint_has_single_catch_all_flow() {
        let xml = endpoint_xml("x", "/x", &PolicySet::new());
        assert_eq!(xml.matches("<Flow name=").count(), 1);
        assert!(xml.contains(r#"<Condition>proxy.pathsuffix MatchesPath "/**"</Condition>"#));
    }

    #[test]
    fn target_endpoint_snapshot() {
        insta::assert_snapshot!(target_xml("  https://backend.example.com/api.; "), @r###"
        <?xml version="1.0" encoding="UTF-8" standalone="yes"?>
        <TargetEndpoint name="default">
          <Description>Default target endpoint</Description>
          <PreFlow name="PreFlow">
            <Request/>
            <Response/>
          </PreFlow>
          <PostFlow name="PostFlow">
            <Request/>
            <Response/>
          </PostFlow>
          <Flows/>
          <HTTPTargetConnection>
            <URL>https://backend.example.com/api</URL>
            <Properties/>
          </HTTPTargetConnection>
        </TargetEndpoint>
        "###);
    }

    #[test]
    fn spike_arrest_rate_comes_from_request() {
        let xml = policy_xml(&PolicyKind::SpikeArrest, "allow 4 requests per sec");
        assert!(xml.contains("<Rate>4ps</Rate>"));

        let xml = policy_xml(&PolicyKind::SpikeArrest, "spike arrest please");
        assert!(xml.contains("<Rate>10ps</Rate>"));
    }

    #[test]
    fn unknown_policy_gets_generic_body() {
        let xml = policy_xml(&PolicyKind::Other("OAuthV2".into()), "");
        assert_eq!(
            xml,
            format!(
                "{XML_DECL}\n<OAuthV2 name=\"OAuthV2\">\n  <DisplayName>OAuthV2</DisplayName>\n</OAuthV2>"
            )
        );
    }

    #[test]
    fn javascript_policy_references_resource() {
        let xml = policy_xml(&PolicyKind::JavaScript, "");
        assert!(xml.contains("<ResourceURL>jsc://transformation.js</ResourceURL>"));
    }

    #[test]
    fn name_combination_script_selected_by_vocabulary() {
        assert_eq!(script_js("firstName and lastName"), NAME_COMBINATION_SCRIPT);
        assert_eq!(script_js("build FULLNAME"), NAME_COMBINATION_SCRIPT);
    }

    #[test]
    fn generic_script_carries_intent() {
        let js = script_js("uppercase the city field");
        assert!(js.starts_with("// Custom transformation: uppercase the city field\n"));
        assert!(js.contains("// Implement custom logic for: uppercase the city field"));
        assert!(js.contains("data.transformed = true;"));
    }
}
